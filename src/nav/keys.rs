use crate::nav::tree::ChildNode;

// Names are escaped so that '/' and '#' only ever appear as key syntax.
fn escape(name: &str) -> String {
    name.replace('%', "%25")
        .replace('/', "%2F")
        .replace('#', "%23")
}

pub fn entry_key(wrap: &str) -> String {
    format!("wrap:{}", escape(wrap))
}

pub fn child_key(wrap: &str, child: &ChildNode) -> String {
    match child {
        ChildNode::Resource(r) => format!("{}/{}", entry_key(wrap), escape(&r.name)),
        _ => format!("{}/#placeholder", entry_key(wrap)),
    }
}
