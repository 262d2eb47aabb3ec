//! Soft restrictions that simulate constrained hardware.

use glsim::SoftRestrictions;

/// Clamp the advertised texture unit count to the wrapped value.
///
/// ```rust
/// use glsim::{Context, ContextDescriptor};
/// use glsim_test_utils::TextureUnitLimit;
///
/// let context = Context::new(ContextDescriptor::default().with_restrictions(TextureUnitLimit(2)));
/// assert_eq!(context.limits().max_texture_units, 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureUnitLimit(pub u32);

impl SoftRestrictions for TextureUnitLimit {
    fn restrict_texture_unit_count(&self, count: u32) -> u32 {
        count.min(self.0)
    }
}

/// Hide the named extensions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HiddenExtensions(pub Vec<String>);

impl HiddenExtensions {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }
}

impl SoftRestrictions for HiddenExtensions {
    fn restrict_extension_visibility(&self, name: &str) -> bool {
        !self.0.iter().any(|hidden| hidden == name)
    }
}
