#![no_main]
use libfuzzer_sys::fuzz_target;
use panconf::{Node, Selector};

fuzz_target!(|data: &[u8]| {
    if let Ok(expression) = std::str::from_utf8(data) {
        if let Ok(selector) = Selector::parse(expression) {
            let root = Node::new("config")
                .with_child(Node::new("shared").with_child(Node::new("entry").with_attribute("name", "a")));
            let _ = selector.select(&root);
        }
    }
});
