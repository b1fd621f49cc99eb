use crate::entities::FileEntities;
use serde::{Deserialize, Serialize};

/// Kinds of entity that can appear in a file's structural hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    File,
    Class,
    AbstractClass,
    Interface,
    Enum,
    Function,
    Method,
    Property,
    Variable,
}

/// One node of the file → class → member tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainmentNode {
    pub name: String,
    pub kind: EntityKind,
    pub line: usize,
    pub children: Vec<ContainmentNode>,
}

impl ContainmentNode {
    fn leaf(name: &str, kind: EntityKind, line: usize) -> Self {
        Self {
            name: name.to_string(),
            kind,
            line,
            children: Vec::new(),
        }
    }

    /// Depth-first iteration paired with each node's parent
    pub fn iter_with_parent(&self) -> Vec<(Option<&ContainmentNode>, &ContainmentNode)> {
        let mut out = vec![(None, self)];
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            for child in &node.children {
                out.push((Some(node), child));
            }
            stack.extend(node.children.iter().rev());
        }
        out
    }

    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Self::count).sum::<usize>()
    }
}

/// Build the structural parent/child hierarchy for a file.
///
/// Independent of imports and calls: only lexical nesting is represented.
/// Nested classes hang off their enclosing class; a class whose recorded
/// parent cannot be found falls back to the file.
pub fn build_containment(entities: &FileEntities) -> ContainmentNode {
    let mut root = ContainmentNode::leaf(&entities.path, EntityKind::File, 1);

    let class_nodes: Vec<ContainmentNode> = entities
        .classes
        .iter()
        .map(|class| {
            let kind = if class.is_abstract {
                EntityKind::AbstractClass
            } else {
                EntityKind::Class
            };
            let mut node = ContainmentNode::leaf(&class.name, kind, class.line);
            for property in &class.properties {
                node.children.push(ContainmentNode::leaf(
                    &property.name,
                    EntityKind::Property,
                    property.line,
                ));
            }
            for method in &class.methods {
                node.children.push(ContainmentNode::leaf(
                    &method.name,
                    EntityKind::Method,
                    method.line,
                ));
            }
            node
        })
        .collect();

    // Attach innermost classes first so a nested class carries its own
    // nested children when it is moved under its parent.
    let mut slots: Vec<Option<ContainmentNode>> = class_nodes.into_iter().map(Some).collect();
    for idx in (0..entities.classes.len()).rev() {
        let parent_idx = entities.classes[idx]
            .parent_class
            .as_deref()
            .and_then(|parent| {
                (0..idx)
                    .rev()
                    .find(|&candidate| entities.classes[candidate].name == parent)
            });
        if let Some(parent_idx) = parent_idx {
            if let Some(child) = slots[idx].take() {
                if let Some(parent) = slots[parent_idx].as_mut() {
                    parent.children.push(child);
                }
            }
        }
    }
    root.children.extend(slots.into_iter().flatten());

    for interface in &entities.interfaces {
        root.children.push(ContainmentNode::leaf(
            &interface.name,
            EntityKind::Interface,
            interface.line,
        ));
    }
    for item in &entities.enums {
        root.children
            .push(ContainmentNode::leaf(&item.name, EntityKind::Enum, item.line));
    }
    for function in &entities.functions {
        root.children.push(ContainmentNode::leaf(
            &function.name,
            EntityKind::Function,
            function.line,
        ));
    }
    for variable in &entities.variables {
        root.children.push(ContainmentNode::leaf(
            &variable.name,
            EntityKind::Variable,
            variable.line,
        ));
    }

    root
}
