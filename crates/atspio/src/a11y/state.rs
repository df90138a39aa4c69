/*!
Object states.

`GetState` returns the state set as two 32-bit words; bit `k` of the combined
64-bit value is set iff the state with wire position `k` is active.
*/

use std::fmt;

/// Combine the two words of a wire state set: `low | (high << 32)`.
///
/// ```
/// use atspio::a11y::decode_state;
///
/// assert_eq!(decode_state(0xFFFF_FFFF, 0x0000_0001), 0x1_FFFF_FFFF);
/// ```
pub const fn decode_state(low: u32, high: u32) -> u64 {
  (low as u64) | ((high as u64) << 32)
}

/// A single state, with its wire bit position as discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum StateFlag {
  Invalid = 0,
  Active,
  Armed,
  Busy,
  Checked,
  Collapsed,
  Defunct,
  Editable,
  Enabled,
  Expandable,
  Expanded,
  Focusable,
  Focused,
  HasTooltip,
  Horizontal,
  Iconified,
  Modal,
  MultiLine,
  Multiselectable,
  Opaque,
  Pressed,
  Resizable,
  Selectable,
  Selected,
  Sensitive,
  Showing,
  SingleLine,
  Stale,
  Transient,
  Vertical,
  Visible,
  ManagesDescendants,
  Indeterminate,
  Required,
  Truncated,
  Animated,
  InvalidEntry,
  SupportsAutocompletion,
  SelectableText,
  IsDefault,
  Visited,
  Checkable,
  HasPopup,
  ReadOnly,
}

impl StateFlag {
  pub const ALL: [Self; 44] = [
    Self::Invalid,
    Self::Active,
    Self::Armed,
    Self::Busy,
    Self::Checked,
    Self::Collapsed,
    Self::Defunct,
    Self::Editable,
    Self::Enabled,
    Self::Expandable,
    Self::Expanded,
    Self::Focusable,
    Self::Focused,
    Self::HasTooltip,
    Self::Horizontal,
    Self::Iconified,
    Self::Modal,
    Self::MultiLine,
    Self::Multiselectable,
    Self::Opaque,
    Self::Pressed,
    Self::Resizable,
    Self::Selectable,
    Self::Selected,
    Self::Sensitive,
    Self::Showing,
    Self::SingleLine,
    Self::Stale,
    Self::Transient,
    Self::Vertical,
    Self::Visible,
    Self::ManagesDescendants,
    Self::Indeterminate,
    Self::Required,
    Self::Truncated,
    Self::Animated,
    Self::InvalidEntry,
    Self::SupportsAutocompletion,
    Self::SelectableText,
    Self::IsDefault,
    Self::Visited,
    Self::Checkable,
    Self::HasPopup,
    Self::ReadOnly,
  ];

  /// Bit position in the decoded 64-bit state word.
  pub const fn bit(self) -> u32 {
    self as u32
  }

  /// Name used in state-changed signal descriptors.
  pub const fn name(self) -> &'static str {
    match self {
      Self::Invalid => "invalid",
      Self::Active => "active",
      Self::Armed => "armed",
      Self::Busy => "busy",
      Self::Checked => "checked",
      Self::Collapsed => "collapsed",
      Self::Defunct => "defunct",
      Self::Editable => "editable",
      Self::Enabled => "enabled",
      Self::Expandable => "expandable",
      Self::Expanded => "expanded",
      Self::Focusable => "focusable",
      Self::Focused => "focused",
      Self::HasTooltip => "has-tooltip",
      Self::Horizontal => "horizontal",
      Self::Iconified => "iconified",
      Self::Modal => "modal",
      Self::MultiLine => "multi-line",
      Self::Multiselectable => "multiselectable",
      Self::Opaque => "opaque",
      Self::Pressed => "pressed",
      Self::Resizable => "resizable",
      Self::Selectable => "selectable",
      Self::Selected => "selected",
      Self::Sensitive => "sensitive",
      Self::Showing => "showing",
      Self::SingleLine => "single-line",
      Self::Stale => "stale",
      Self::Transient => "transient",
      Self::Vertical => "vertical",
      Self::Visible => "visible",
      Self::ManagesDescendants => "manages-descendants",
      Self::Indeterminate => "indeterminate",
      Self::Required => "required",
      Self::Truncated => "truncated",
      Self::Animated => "animated",
      Self::InvalidEntry => "invalid-entry",
      Self::SupportsAutocompletion => "supports-autocompletion",
      Self::SelectableText => "selectable-text",
      Self::IsDefault => "is-default",
      Self::Visited => "visited",
      Self::Checkable => "checkable",
      Self::HasPopup => "has-popup",
      Self::ReadOnly => "read-only",
    }
  }

  pub fn from_name(name: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|flag| flag.name() == name)
  }
}

impl fmt::Display for StateFlag {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// 64-bit state set of one object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StateSet(u64);

impl StateSet {
  pub const fn from_bits(bits: u64) -> Self {
    Self(bits)
  }

  /// Build from the two words returned by `GetState`.
  pub const fn from_words(low: u32, high: u32) -> Self {
    Self(decode_state(low, high))
  }

  pub const fn bits(&self) -> u64 {
    self.0
  }

  pub const fn contains(&self, flag: StateFlag) -> bool {
    (self.0 >> flag.bit()) & 1 == 1
  }

  pub const fn is_empty(&self) -> bool {
    self.0 == 0
  }

  #[must_use]
  pub const fn with(self, flag: StateFlag) -> Self {
    Self(self.0 | (1 << flag.bit()))
  }

  pub fn iter(&self) -> impl Iterator<Item = StateFlag> + '_ {
    StateFlag::ALL
      .into_iter()
      .filter(|&flag| self.contains(flag))
  }

  /// Names of all active states, in bit order.
  pub fn names(&self) -> Vec<&'static str> {
    self.iter().map(StateFlag::name).collect()
  }
}


#[cfg(test)]
mod proptests {
  use super::*;
  use proptest::prelude::*;

  proptest! {
    #[test]
    fn bit_set_iff_flag_present(low in any::<u32>(), high in any::<u32>()) {
      let state = decode_state(low, high);
      let set = StateSet::from_words(low, high);
      for flag in StateFlag::ALL {
        let k = flag.bit();
        prop_assert_eq!(set.contains(flag), (state >> k) & 1 == 1);
      }
    }

    #[test]
    fn words_survive_decoding(low in any::<u32>(), high in any::<u32>()) {
      let state = decode_state(low, high);
      prop_assert_eq!(state & 0xFFFF_FFFF, u64::from(low));
      prop_assert_eq!(state >> 32, u64::from(high));
    }
  }
}
