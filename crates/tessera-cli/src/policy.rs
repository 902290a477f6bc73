//! Turning a [`Config`] into the schema and policy the engine runs with.

use std::collections::HashSet;

use tessera_config::Config;
use tessera_engine::{ConfiguredSchema, EditingPolicy, NodeId, Tree};

fn any_class(classes: &[String]) -> impl Fn(&Tree, NodeId) -> bool + 'static {
    let classes: HashSet<String> = classes.iter().cloned().collect();
    move |tree: &Tree, node: NodeId| {
        tree.element(node)
            .is_some_and(|el| el.classes.iter().any(|c| classes.contains(c)))
    }
}

fn any_tag(tags: &[String]) -> impl Fn(&Tree, NodeId) -> bool + 'static {
    let tags: HashSet<String> = tags.iter().cloned().collect();
    move |tree: &Tree, node: NodeId| tree.tag(node).is_some_and(|tag| tags.contains(tag.as_str()))
}

pub fn build_policy(config: &Config) -> EditingPolicy {
    let schema = ConfiguredSchema::new()
        .block_tags(config.schema.block_tags.iter().cloned())
        .inline_tags(config.schema.inline_tags.iter().cloned())
        .self_closing_tags(config.schema.self_closing_tags.iter().cloned())
        .non_editable_classes(config.policy.non_editable_classes.iter().cloned());

    let mut policy = EditingPolicy::new(schema);
    let rules = &config.policy;
    if !rules.unremovable_classes.is_empty() {
        policy = policy.unremovable(any_class(&rules.unremovable_classes));
    }
    if !rules.unbreakable_classes.is_empty() {
        policy = policy.unbreakable(any_class(&rules.unbreakable_classes));
    }
    if !rules.unbreakable_tags.is_empty() {
        policy = policy.unbreakable(any_tag(&rules.unbreakable_tags));
    }
    log::debug!("policy from config: {policy:?}");
    policy
}
