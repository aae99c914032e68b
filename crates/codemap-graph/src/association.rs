//! Method-to-class association.
//!
//! Functions whose line range falls inside a class move into that class's
//! method list. When classes nest, the innermost one wins.

use std::collections::HashSet;

use crate::model::{Class, FileInfo};

/// Move functions contained in a class into the class's `methods`.
///
/// Identity is the definition byte offset, so same-named functions in
/// different scopes never collide. Running this twice yields the same
/// partition as running it once.
pub fn associate_methods(file: &mut FileInfo) {
    if file.classes.is_empty() {
        return;
    }

    let mut moved = HashSet::new();
    for (index, function) in file.functions.iter().enumerate() {
        let Some(owner) = innermost_class(&file.classes, function.start_line, function.end_line)
        else {
            continue;
        };
        moved.insert(index);

        let class = &mut file.classes[owner];
        if class.methods.iter().any(|m| m.offset == function.offset) {
            continue;
        }
        let mut method = function.clone();
        method.is_method = true;
        class.methods.push(method);
    }

    if moved.is_empty() {
        return;
    }

    let functions = std::mem::take(&mut file.functions);
    file.functions = functions
        .into_iter()
        .enumerate()
        .filter(|(index, _)| !moved.contains(index))
        .map(|(_, function)| function)
        .collect();

    for class in &mut file.classes {
        class
            .methods
            .sort_by_key(|m| (m.start_line, m.offset));
    }
}

/// Index of the smallest class whose range contains the given lines.
fn innermost_class(classes: &[Class], start_line: usize, end_line: usize) -> Option<usize> {
    classes
        .iter()
        .enumerate()
        .filter(|(_, class)| class.contains_lines(start_line, end_line))
        .min_by_key(|(_, class)| (class.line_count(), std::cmp::Reverse(class.start_line)))
        .map(|(index, _)| index)
}
