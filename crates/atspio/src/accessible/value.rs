//! Numeric value accessors (Value interface).

use super::Accessible;
use crate::a11y::Interface;
use crate::bus::names::interface::VALUE;
use crate::bus::WireValue;
use crate::types::{AtspioError, AtspioResult};

impl Accessible {
  fn value_property(&self, name: &str) -> AtspioResult<f64> {
    self.require(Interface::Value)?;
    self
      .ctx
      .property(self.identity(), VALUE, name)?
      .as_f64()
      .ok_or_else(|| AtspioError::malformed(name, "expected a number"))
  }

  /// Current value; zero on failure.
  pub fn current_value(&self) -> f64 {
    self.neutral("CurrentValue", self.value_property("CurrentValue"))
  }

  /// Lower bound of the value range.
  pub fn minimum_value(&self) -> f64 {
    self.neutral("MinimumValue", self.value_property("MinimumValue"))
  }

  /// Upper bound of the value range.
  pub fn maximum_value(&self) -> f64 {
    self.neutral("MaximumValue", self.value_property("MaximumValue"))
  }

  /// Smallest step the value changes by; `0.0` when continuous.
  pub fn minimum_increment(&self) -> f64 {
    self.neutral("MinimumIncrement", self.value_property("MinimumIncrement"))
  }

  /// Write `CurrentValue`. False when the write failed.
  pub fn set_current_value(&self, value: f64) -> bool {
    let result = self.require(Interface::Value).and_then(|()| {
      self
        .ctx
        .set_property(self.identity(), VALUE, "CurrentValue", WireValue::F64(value))
    });
    self.checked("Set CurrentValue", result).is_some()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::bus::names::interface::ACCESSIBLE;
  use crate::bus::MethodCall;
  use crate::core::test_instance;
  use crate::testing::id;

  #[test]
  fn reads_and_sets_value() {
    let (atspio, bus) = test_instance();
    let slider = id("/slider");
    bus.script_interfaces(&slider, &[ACCESSIBLE, VALUE]);
    bus.script_property(&slider, VALUE, "CurrentValue", WireValue::F64(0.25));
    bus.script_property(&slider, VALUE, "MaximumValue", WireValue::I32(10));
    bus.script_member("Set", Ok(Vec::new()));

    let handle = atspio.accessible(slider.clone());
    assert!((handle.current_value() - 0.25).abs() < f64::EPSILON);
    assert!((handle.maximum_value() - 10.0).abs() < f64::EPSILON);
    assert!(handle.set_current_value(0.75));

    let set = bus.calls_to("Set").pop();
    let expected = MethodCall::property_set(
      slider.bus_name(),
      slider.object_path(),
      VALUE,
      "CurrentValue",
      WireValue::F64(0.75),
    );
    assert_eq!(set, Some(expected));
  }
}
