/*!
Text and editable-text accessors.

Offsets count characters. Selections come back ordered: a reversed
`(start, end)` pair from the wire is swapped before it is returned.
*/

use super::component::{rect_boxed, rect_flat, SCREEN_COORDS};
use super::Accessible;
use crate::a11y::Interface;
use crate::bus::names::interface::{EDITABLE_TEXT, TEXT};
use crate::bus::wire::{decode_shapes, first};
use crate::bus::{MethodCall, WireValue};
use crate::types::{AtspioError, AtspioResult, Rect, TextBoundary, TextRange, TextSegment};

fn range_reply(member: &str, reply: &[WireValue]) -> AtspioResult<TextRange> {
  match reply {
    [start, end] => match (start.as_i32(), end.as_i32()) {
      (Some(start), Some(end)) => Ok(TextRange::new(start, end)),
      _ => Err(AtspioError::malformed(member, "expected two offsets")),
    },
    _ => Err(AtspioError::malformed(member, "expected two offsets")),
  }
}

fn bool_reply(member: &str, reply: &[WireValue]) -> AtspioResult<bool> {
  first(member, reply)?
    .as_bool()
    .ok_or_else(|| AtspioError::malformed(member, "expected a boolean"))
}

fn int_reply(member: &str, value: &WireValue) -> AtspioResult<i32> {
  value
    .as_i32()
    .ok_or_else(|| AtspioError::malformed(member, "expected an integer"))
}

impl Accessible {
  fn text_call(&self, call: MethodCall) -> AtspioResult<Vec<WireValue>> {
    self.require(Interface::Text)?;
    self.ctx.call(&call)
  }

  fn text_method(&self, member: &'static str) -> MethodCall {
    MethodCall::on(self.identity(), TEXT, member)
  }

  fn text_property(&self, name: &str) -> AtspioResult<i32> {
    self.require(Interface::Text)?;
    let value = self.ctx.property(self.identity(), TEXT, name)?;
    int_reply(name, &value)
  }

  /// Caret position in characters.
  pub fn caret_offset(&self) -> i32 {
    self.neutral("CaretOffset", self.text_property("CaretOffset"))
  }

  /// Text length in characters.
  pub fn character_count(&self) -> i32 {
    self.neutral("CharacterCount", self.text_property("CharacterCount"))
  }

  /// Text in `range`; an end of `-1` reads to the end.
  pub fn text(&self, range: TextRange) -> String {
    let result = self
      .text_call(self.text_method("GetText").arg(range.start).arg(range.end))
      .and_then(|reply| {
        first("GetText", &reply)?
          .as_str()
          .map(str::to_owned)
          .ok_or_else(|| AtspioError::malformed("GetText", "expected a string"))
      });
    self.neutral("GetText", result)
  }

  /// The whole text.
  pub fn full_text(&self) -> String {
    self.text(TextRange::new(0, -1))
  }

  /// The word, sentence, or line around `offset`, with its resolved offsets.
  pub fn text_with_boundaries(&self, offset: i32, boundary: TextBoundary) -> TextSegment {
    let call = self
      .text_method("GetTextAtOffset")
      .arg(offset)
      .arg(boundary.wire_code());
    let result = self.text_call(call).and_then(|reply| match reply.as_slice() {
      [text, start, end] => Ok(TextSegment {
        text: text
          .as_str()
          .map(str::to_owned)
          .ok_or_else(|| AtspioError::malformed("GetTextAtOffset", "expected a string"))?,
        range: range_reply("GetTextAtOffset", &[start.clone(), end.clone()])?,
      }),
      _ => Err(AtspioError::malformed("GetTextAtOffset", "expected (sii)")),
    });
    self.neutral("GetTextAtOffset", result)
  }

  /// Screen rectangle of the character at `offset`.
  pub fn character_rect(&self, offset: i32) -> Rect {
    let call = self
      .text_method("GetCharacterExtents")
      .arg(offset)
      .arg(SCREEN_COORDS);
    let result = self.text_call(call).and_then(|reply| {
      decode_shapes("GetCharacterExtents", &reply, &[rect_flat, rect_boxed])
    });
    self.neutral("GetCharacterExtents", result)
  }

  /// Current selections, each with `start <= end`.
  pub fn selections(&self) -> Vec<TextRange> {
    self.neutral("GetSelection", self.fetch_selections())
  }

  fn selection_count(&self) -> AtspioResult<i32> {
    let reply = self.text_call(self.text_method("GetNSelections"))?;
    int_reply("GetNSelections", first("GetNSelections", &reply)?)
  }

  fn fetch_selections(&self) -> AtspioResult<Vec<TextRange>> {
    let count = self.selection_count()?;
    (0..count)
      .map(|index| {
        let reply = self.ctx.call(&self.text_method("GetSelection").arg(index))?;
        range_reply("GetSelection", &reply).map(TextRange::normalized)
      })
      .collect()
  }

  /// Replace the selections with `ranges`, reusing existing slots first.
  pub fn set_selections(&self, ranges: &[TextRange]) -> bool {
    let result = self.apply_selections(ranges);
    self.neutral("SetSelection", result)
  }

  fn apply_selections(&self, ranges: &[TextRange]) -> AtspioResult<bool> {
    let existing = self.selection_count()?;
    let mut ok = true;
    for (index, range) in (0..).zip(ranges) {
      let range = range.normalized();
      let call = if index < existing {
        self
          .text_method("SetSelection")
          .arg(index)
          .arg(range.start)
          .arg(range.end)
      } else {
        self.text_method("AddSelection").arg(range.start).arg(range.end)
      };
      let member = call.member;
      ok &= bool_reply(member, &self.ctx.call(&call)?)?;
    }
    let requested = i32::try_from(ranges.len()).unwrap_or(i32::MAX);
    for index in (requested..existing).rev() {
      let reply = self.ctx.call(&self.text_method("RemoveSelection").arg(index))?;
      ok &= bool_reply("RemoveSelection", &reply)?;
    }
    Ok(ok)
  }

  fn editable(&self, call: MethodCall) -> bool {
    let member = call.member;
    let result = self.require(Interface::EditableText).and_then(|()| {
      let reply = self.ctx.call(&call)?;
      if reply.is_empty() {
        return Ok(true);
      }
      bool_reply(member, &reply)
    });
    self.neutral(member, result)
  }

  fn editable_method(&self, member: &'static str) -> MethodCall {
    MethodCall::on(self.identity(), EDITABLE_TEXT, member)
  }

  /// Replace the entire text.
  pub fn set_text(&self, text: &str) -> bool {
    self.editable(self.editable_method("SetTextContents").arg(text))
  }

  /// Insert `text` before the character at `position`.
  pub fn insert_text(&self, position: i32, text: &str) -> bool {
    let length = i32::try_from(text.chars().count()).unwrap_or(i32::MAX);
    self.editable(
      self
        .editable_method("InsertText")
        .arg(position)
        .arg(text)
        .arg(length),
    )
  }

  /// Copy `range` to the clipboard.
  pub fn copy_text(&self, range: TextRange) -> bool {
    self.editable(
      self
        .editable_method("CopyText")
        .arg(range.start)
        .arg(range.end),
    )
  }

  /// Cut `range` to the clipboard.
  pub fn cut_text(&self, range: TextRange) -> bool {
    self.editable(self.editable_method("CutText").arg(range.start).arg(range.end))
  }

  /// Delete `range` without touching the clipboard.
  pub fn delete_text(&self, range: TextRange) -> bool {
    self.editable(
      self
        .editable_method("DeleteText")
        .arg(range.start)
        .arg(range.end),
    )
  }

  /// Paste the clipboard at `position`.
  pub fn paste_text(&self, position: i32) -> bool {
    self.editable(self.editable_method("PasteText").arg(position))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::bus::names::interface::ACCESSIBLE;
  use crate::core::test_instance;
  use crate::testing::{capture_warnings, id, FakeBus};
  use crate::types::ObjectIdentity;

  fn text_object(bus: &FakeBus, path: &str, editable: bool) -> ObjectIdentity {
    let object = id(path);
    if editable {
      bus.script_interfaces(&object, &[ACCESSIBLE, TEXT, EDITABLE_TEXT]);
    } else {
      bus.script_interfaces(&object, &[ACCESSIBLE, TEXT]);
    }
    object
  }

  #[test]
  fn reversed_selection_is_ordered() {
    let (atspio, bus) = test_instance();
    let object = text_object(&bus, "/entry", false);
    bus.script_ok(
      MethodCall::on(&object, TEXT, "GetNSelections"),
      vec![WireValue::I32(1)],
    );
    bus.script_ok(
      MethodCall::on(&object, TEXT, "GetSelection").arg(0),
      vec![WireValue::I32(10), WireValue::I32(3)],
    );

    let selections = atspio.accessible(object).selections();
    assert_eq!(selections, vec![TextRange::new(3, 10)]);
  }

  #[test]
  fn set_selections_reuses_adds_and_removes() {
    let (atspio, bus) = test_instance();
    let object = text_object(&bus, "/entry", false);
    bus.script_ok(
      MethodCall::on(&object, TEXT, "GetNSelections"),
      vec![WireValue::I32(3)],
    );
    bus.script_member("SetSelection", Ok(vec![WireValue::Bool(true)]));
    bus.script_member("RemoveSelection", Ok(vec![WireValue::Bool(true)]));
    let handle = atspio.accessible(object);

    assert!(handle.set_selections(&[TextRange::new(8, 2)]));
    let set = bus.calls_to("SetSelection");
    assert_eq!(set.len(), 1);
    assert_eq!(
      set.first().map(|c| c.args.clone()),
      Some(vec![WireValue::I32(0), WireValue::I32(2), WireValue::I32(8)])
    );
    let removed: Vec<_> = bus
      .calls_to("RemoveSelection")
      .into_iter()
      .map(|c| c.args)
      .collect();
    assert_eq!(removed, vec![vec![WireValue::I32(2)], vec![WireValue::I32(1)]]);
    assert!(bus.calls_to("AddSelection").is_empty());
  }

  #[test]
  fn character_extents_modern_and_legacy() {
    let (atspio, bus) = test_instance();
    let object = text_object(&bus, "/doc", false);
    let extents = |offset: i32| {
      MethodCall::on(&object, TEXT, "GetCharacterExtents")
        .arg(offset)
        .arg(SCREEN_COORDS)
    };
    bus.script_ok(
      extents(0),
      vec![
        WireValue::I32(1),
        WireValue::I32(2),
        WireValue::I32(8),
        WireValue::I32(16),
      ],
    );
    bus.script_ok(
      extents(1),
      vec![WireValue::Struct(vec![
        WireValue::I32(9),
        WireValue::I32(2),
        WireValue::I32(8),
        WireValue::I32(16),
      ])],
    );
    let handle = atspio.accessible(object.clone());

    let (rects, warnings) =
      capture_warnings(|| (handle.character_rect(0), handle.character_rect(1)));
    assert_eq!(rects.0, Rect::new(1, 2, 8, 16));
    assert_eq!(rects.1, Rect::new(9, 2, 8, 16));
    assert!(warnings.is_empty());
  }

  #[test]
  fn boundary_query_returns_offsets() {
    let (atspio, bus) = test_instance();
    let object = text_object(&bus, "/doc", false);
    bus.script_ok(
      MethodCall::on(&object, TEXT, "GetTextAtOffset")
        .arg(7)
        .arg(TextBoundary::WordStart.wire_code()),
      vec![WireValue::from("world "), WireValue::I32(6), WireValue::I32(12)],
    );

    let segment = atspio
      .accessible(object)
      .text_with_boundaries(7, TextBoundary::WordStart);
    assert_eq!(segment.text, "world ");
    assert_eq!(segment.range, TextRange::new(6, 12));
  }

  #[test]
  fn mutators_need_editable_text() {
    let (atspio, bus) = test_instance();
    let read_only = text_object(&bus, "/label", false);
    let editable = text_object(&bus, "/entry", true);
    bus.script_member("InsertText", Ok(vec![WireValue::Bool(true)]));

    let (inserted, warnings) = capture_warnings(|| atspio.accessible(read_only).insert_text(0, "x"));
    assert!(!inserted);
    assert_eq!(warnings.len(), 1);
    assert!(bus.calls_to("InsertText").is_empty());

    assert!(atspio.accessible(editable.clone()).insert_text(2, "héllo"));
    let call = bus.calls_to("InsertText").pop();
    assert_eq!(
      call.map(|c| c.args),
      Some(vec![
        WireValue::I32(2),
        WireValue::from("héllo"),
        WireValue::I32(5)
      ])
    );
  }

  #[test]
  fn editable_mutators_address_ranges() {
    let (atspio, bus) = test_instance();
    let object = text_object(&bus, "/entry", true);
    bus.script_member("SetTextContents", Ok(vec![WireValue::Bool(true)]));
    bus.script_member("CopyText", Ok(Vec::new()));
    bus.script_member("CutText", Ok(vec![WireValue::Bool(true)]));
    bus.script_member("DeleteText", Ok(vec![WireValue::Bool(false)]));
    bus.script_member("PasteText", Ok(vec![WireValue::Bool(true)]));
    let handle = atspio.accessible(object);

    let (results, warnings) = capture_warnings(|| {
      [
        handle.set_text("replaced"),
        handle.copy_text(TextRange::new(1, 4)),
        handle.cut_text(TextRange::new(2, 5)),
        handle.delete_text(TextRange::new(0, 3)),
        handle.paste_text(6),
      ]
    });
    assert_eq!(results, [true, true, true, false, true]);
    assert!(warnings.is_empty());

    let args = |member: &str| bus.calls_to(member).pop().map(|c| c.args);
    assert_eq!(args("SetTextContents"), Some(vec![WireValue::from("replaced")]));
    assert_eq!(args("CopyText"), Some(vec![WireValue::I32(1), WireValue::I32(4)]));
    assert_eq!(args("CutText"), Some(vec![WireValue::I32(2), WireValue::I32(5)]));
    assert_eq!(args("DeleteText"), Some(vec![WireValue::I32(0), WireValue::I32(3)]));
    assert_eq!(args("PasteText"), Some(vec![WireValue::I32(6)]));
  }

  #[test]
  fn failed_mutator_warns_once() {
    let (atspio, bus) = test_instance();
    let object = text_object(&bus, "/entry", true);
    let handle = atspio.accessible(object);

    let (pasted, warnings) = capture_warnings(|| handle.paste_text(0));
    assert!(!pasted);
    assert_eq!(warnings.len(), 1);
  }
}
