use std::collections::HashMap;

use bevy::prelude::*;

/// Named nodes of every loaded model, keyed by model id then node name.
#[derive(Resource, Debug, Default)]
pub struct ModelNodes {
    models: HashMap<String, HashMap<String, Entity>>,
}

impl ModelNodes {
    pub fn insert_model(&mut self, model: impl Into<String>, nodes: HashMap<String, Entity>) {
        self.models.insert(model.into(), nodes);
    }

    pub fn is_loaded(&self, model: &str) -> bool {
        self.models.contains_key(model)
    }

    pub fn lookup(&self, model: &str, node: &str) -> Option<Entity> {
        self.models.get(model)?.get(node).copied()
    }

    /// Like `lookup`, but logs a warning for names missing from a loaded model.
    pub fn lookup_or_warn(&self, model: &str, node: &str) -> Option<Entity> {
        let found = self.lookup(model, node);
        if found.is_none() && self.is_loaded(model) {
            warn!("Node {} not found in model {}", node, model);
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_model_and_name() {
        let mut nodes = ModelNodes::default();
        let globe = Entity::from_raw(7);
        nodes.insert_model("station", HashMap::from([("Globe".to_string(), globe)]));

        assert!(nodes.is_loaded("station"));
        assert_eq!(nodes.lookup("station", "Globe"), Some(globe));
        assert_eq!(nodes.lookup("station", "Missing"), None);
        assert_eq!(nodes.lookup("other", "Globe"), None);
    }
}
