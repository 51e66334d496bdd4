// Window Contexts
// Per-window-class behaviour from [[WindowClasses]]

use regex::Regex;

/// One `[[WindowClasses]]` entry
#[derive(Debug, Clone)]
pub struct WindowContext {
    /// `None` matches every window, including one without a class
    pub class_pattern: Option<Regex>,
    pub actions_enabled: bool,
    pub mouse_click_drops: bool,
}

impl WindowContext {
    /// Wildcard context with actions enabled
    pub fn any() -> Self {
        Self {
            class_pattern: None,
            actions_enabled: true,
            mouse_click_drops: true,
        }
    }

    /// A pattern never matches an empty class name
    pub fn matches(&self, class_name: &str) -> bool {
        match &self.class_pattern {
            Some(re) => !class_name.is_empty() && re.is_match(class_name),
            None => true,
        }
    }
}

/// Index of the first context matching the class, in declaration order
pub fn select_context(contexts: &[WindowContext], class_name: &str) -> Option<usize> {
    contexts.iter().position(|ctx| ctx.matches(class_name))
}
