//! Parameters — user-editable values with declared display metadata.
//!
//! Bounds and step sizes configure the editing widget only. Writes through
//! [`Parameter::set`] are never range-checked, so a persisted value that
//! lies outside its declared range is kept verbatim and re-encoded
//! unchanged. The range and display helpers serve the form renderer
//! through [`crate::form::Widget`].

use crate::i18n::TextKey;

/// Fixed-point display format for a numeric parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberFormat {
    decimals: usize,
}

impl NumberFormat {
    /// Render with exactly `decimals` fractional digits.
    #[must_use]
    pub const fn fixed(decimals: usize) -> Self {
        Self { decimals }
    }

    #[must_use]
    pub const fn decimals(self) -> usize {
        self.decimals
    }

    #[must_use]
    pub fn format(self, value: f64) -> String {
        format!("{value:.prec$}", prec = self.decimals)
    }
}

/// A bounded scalar value.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter<T> {
    value: T,
    min: T,
    max: T,
    step: T,
    format: NumberFormat,
}

impl<T: Copy + PartialOrd> Parameter<T> {
    #[must_use]
    pub const fn new(value: T, min: T, max: T, step: T, format: NumberFormat) -> Self {
        Self {
            value,
            min,
            max,
            step,
            format,
        }
    }

    #[must_use]
    pub fn get(&self) -> T {
        self.value
    }

    /// Store `value` as is, without checking it against the bounds.
    pub fn set(&mut self, value: T) {
        self.value = value;
    }

    /// An independent parameter with the same value and metadata.
    #[must_use]
    pub fn copy(&self) -> Self {
        Self {
            value: self.value,
            min: self.min,
            max: self.max,
            step: self.step,
            format: self.format,
        }
    }

    #[must_use]
    pub fn min(&self) -> T {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> T {
        self.max
    }

    #[must_use]
    pub fn step(&self) -> T {
        self.step
    }

    #[must_use]
    pub fn format(&self) -> NumberFormat {
        self.format
    }

    /// Whether the current value lies within the declared bounds.
    #[must_use]
    pub fn in_bounds(&self) -> bool {
        self.value >= self.min && self.value <= self.max
    }

    /// Pin `candidate` to the declared bounds. Used for typed input only;
    /// stored values are never clamped.
    #[must_use]
    pub fn clamp_to_bounds(&self, candidate: T) -> T {
        if candidate < self.min {
            self.min
        } else if candidate > self.max {
            self.max
        } else {
            candidate
        }
    }
}

impl Parameter<f64> {
    /// The current value rendered with the declared format.
    #[must_use]
    pub fn display(&self) -> String {
        self.format.format(self.value)
    }
}

/// A free-form text value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Text {
    value: String,
}

impl Text {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.value
    }

    pub fn set(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }
}

/// One selectable entry of an option table.
#[derive(Debug, PartialEq, Eq)]
pub struct SelectOption<V: 'static> {
    pub value: V,
    pub label: TextKey,
}

/// A choice among the entries of a shared, immutable option table.
///
/// The table is borrowed for `'static`; every instance refers to the same
/// table. The selected value may be a sentinel that is not part of the
/// table, which happens only when decoding corrupted data.
#[derive(Debug, Clone, PartialEq)]
pub struct Select<V: 'static> {
    options: &'static [SelectOption<V>],
    selected: V,
}

impl<V: Copy + PartialEq> Select<V> {
    #[must_use]
    pub const fn new(options: &'static [SelectOption<V>], selected: V) -> Self {
        Self { options, selected }
    }

    #[must_use]
    pub fn get(&self) -> V {
        self.selected
    }

    pub fn set(&mut self, value: V) {
        self.selected = value;
    }

    #[must_use]
    pub fn options(&self) -> &'static [SelectOption<V>] {
        self.options
    }

    /// Whether the selected value is one of the table entries.
    #[must_use]
    pub fn is_selectable(&self) -> bool {
        self.options.iter().any(|o| o.value == self.selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn distance() -> Parameter<f64> {
        Parameter::new(200.0, 0.0, 100_000.0, 10.0, NumberFormat::fixed(0))
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Color {
        Red,
        Blue,
        Corrupted,
    }

    static COLORS: [SelectOption<Color>; 2] = [
        SelectOption {
            value: Color::Red,
            label: TextKey::LocationInside,
        },
        SelectOption {
            value: Color::Blue,
            label: TextKey::LocationOutside,
        },
    ];

    #[test]
    fn should_store_value_outside_bounds_verbatim() {
        let mut p = distance();
        p.set(-5.0);
        assert!((p.get() + 5.0).abs() < f64::EPSILON);
        assert!(!p.in_bounds());
        p.set(250_000.0);
        assert!((p.get() - 250_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn should_copy_independently() {
        let original = distance();
        let mut copy = original.copy();
        copy.set(10.0);
        assert!((original.get() - 200.0).abs() < f64::EPSILON);
        assert!((copy.get() - 10.0).abs() < f64::EPSILON);
        assert!((copy.max() - original.max()).abs() < f64::EPSILON);
        assert_eq!(copy.format(), original.format());
    }

    #[test]
    fn should_clamp_candidate_without_touching_value() {
        let p = distance();
        assert!((p.clamp_to_bounds(-1.0) - 0.0).abs() < f64::EPSILON);
        assert!((p.clamp_to_bounds(1e9) - 100_000.0).abs() < f64::EPSILON);
        assert!((p.clamp_to_bounds(42.0) - 42.0).abs() < f64::EPSILON);
        assert!((p.get() - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn should_display_with_declared_format() {
        let p = Parameter::new(1.5, -90.0, 90.0, 0.000_001, NumberFormat::fixed(6));
        assert_eq!(p.display(), "1.500000");
        assert_eq!(distance().display(), "200");
    }

    #[test]
    fn should_set_and_get_text() {
        let mut t = Text::default();
        assert_eq!(t.get(), "");
        t.set("home");
        assert_eq!(t.get(), "home");
    }

    #[test]
    fn should_share_option_table_between_selects() {
        let a = Select::new(&COLORS, Color::Red);
        let b = Select::new(&COLORS, Color::Blue);
        assert!(std::ptr::eq(a.options(), b.options()));
        assert_eq!(a.options().len(), 2);
    }

    #[test]
    fn should_report_sentinel_as_not_selectable() {
        let mut s = Select::new(&COLORS, Color::Red);
        assert!(s.is_selectable());
        s.set(Color::Corrupted);
        assert_eq!(s.get(), Color::Corrupted);
        assert!(!s.is_selectable());
    }
}
