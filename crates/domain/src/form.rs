//! Form — the contract handed to the rendering collaborator.
//!
//! A trigger describes its editable state as an ordered list of rows. Field
//! rows borrow the trigger's parameters mutably, so a renderer writes user
//! input straight through the normal `set` methods. Buttons are plain
//! [`Command`] values that the renderer hands back to the trigger once the
//! user presses them; no closure crosses the boundary.

use crate::i18n::TextKey;
use crate::parameter::{Parameter, Select, Text};

/// An action a form button requests from its trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Copy the last known position into the trigger's coordinates.
    PopulateFromCurrentPosition,
}

/// A single-choice field, independent of the option type.
pub trait Choice {
    /// Labels of the selectable entries, in display order.
    fn labels(&self) -> Vec<TextKey>;

    /// Index of the selected entry, `None` when a sentinel is selected.
    fn selected_index(&self) -> Option<usize>;

    /// Select the entry at `index`. Out-of-range indices are ignored.
    fn select_index(&mut self, index: usize);

    /// Whether the current selection is one of the listed entries.
    fn has_valid_selection(&self) -> bool;
}

impl<V: Copy + PartialEq> Choice for Select<V> {
    fn labels(&self) -> Vec<TextKey> {
        self.options().iter().map(|o| o.label).collect()
    }

    fn selected_index(&self) -> Option<usize> {
        let selected = self.get();
        self.options().iter().position(|o| o.value == selected)
    }

    fn select_index(&mut self, index: usize) {
        if let Some(option) = self.options().get(index) {
            self.set(option.value);
        }
    }

    fn has_valid_selection(&self) -> bool {
        self.is_selectable()
    }
}

/// The input widget bound to a field row.
pub enum Widget<'a> {
    Decimal(&'a mut Parameter<f64>),
    Text(&'a mut Text),
    Choice(&'a mut dyn Choice),
}

impl Widget<'_> {
    /// The stored value as the widget shows it. `None` for a choice.
    #[must_use]
    pub fn display_value(&self) -> Option<String> {
        match self {
            Self::Decimal(p) => Some(p.display()),
            Self::Text(t) => Some(t.get().to_string()),
            Self::Choice(_) => None,
        }
    }

    /// Whether the stored value is one the widget can present as is.
    ///
    /// Persisted data may hold out-of-range numbers or a sentinel choice;
    /// renderers use this to flag the field instead of silently fixing it.
    #[must_use]
    pub fn is_presentable(&self) -> bool {
        match self {
            Self::Decimal(p) => p.in_bounds(),
            Self::Text(_) => true,
            Self::Choice(c) => c.has_valid_selection(),
        }
    }

    /// Store user input typed into a decimal field, pinned to its bounds.
    ///
    /// Returns `false` and changes nothing for other widgets.
    pub fn enter_decimal(&mut self, input: f64) -> bool {
        match self {
            Self::Decimal(p) => {
                let value = p.clamp_to_bounds(input);
                p.set(value);
                true
            }
            _ => false,
        }
    }
}

impl std::fmt::Debug for Widget<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Decimal(p) => f.debug_tuple("Decimal").field(p).finish(),
            Self::Text(t) => f.debug_tuple("Text").field(t).finish(),
            Self::Choice(c) => f
                .debug_tuple("Choice")
                .field(&c.selected_index())
                .finish(),
        }
    }
}

#[derive(Debug)]
pub enum Row<'a> {
    Heading(TextKey),
    Field { label: TextKey, widget: Widget<'a> },
    Command {
        label: TextKey,
        command: Command,
        enabled: bool,
    },
}

/// Ordered rows describing how to edit a trigger.
#[derive(Debug, Default)]
pub struct Form<'a> {
    rows: Vec<Row<'a>>,
}

impl<'a> Form<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    #[must_use]
    pub fn heading(mut self, key: TextKey) -> Self {
        self.rows.push(Row::Heading(key));
        self
    }

    #[must_use]
    pub fn field(mut self, label: TextKey, widget: Widget<'a>) -> Self {
        self.rows.push(Row::Field { label, widget });
        self
    }

    #[must_use]
    pub fn command(mut self, label: TextKey, command: Command, enabled: bool) -> Self {
        self.rows.push(Row::Command {
            label,
            command,
            enabled,
        });
        self
    }

    #[must_use]
    pub fn rows(&self) -> &[Row<'a>] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [Row<'a>] {
        &mut self.rows
    }

    /// Mutable access to the widget of the field labelled `label`.
    pub fn widget_mut(&mut self, label: TextKey) -> Option<&mut Widget<'a>> {
        self.rows.iter_mut().find_map(|row| match row {
            Row::Field { label: l, widget } if *l == label => Some(widget),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::{NumberFormat, SelectOption};

    static SIDES: [SelectOption<u8>; 2] = [
        SelectOption {
            value: 1,
            label: TextKey::LocationInside,
        },
        SelectOption {
            value: 2,
            label: TextKey::LocationOutside,
        },
    ];

    #[test]
    fn should_keep_rows_in_insertion_order() {
        let mut name = Text::default();
        let form = Form::new()
            .heading(TextKey::Location)
            .field(TextKey::NameShort, Widget::Text(&mut name))
            .command(
                TextKey::CurrentLocation,
                Command::PopulateFromCurrentPosition,
                false,
            );
        assert_eq!(form.rows().len(), 3);
        assert!(matches!(form.rows()[0], Row::Heading(TextKey::Location)));
        assert!(matches!(
            form.rows()[2],
            Row::Command { enabled: false, .. }
        ));
    }

    #[test]
    fn should_write_through_borrowed_parameter() {
        let mut distance = Parameter::new(200.0, 0.0, 100_000.0, 10.0, NumberFormat::fixed(0));
        {
            let mut form = Form::new().field(TextKey::DistanceShort, Widget::Decimal(&mut distance));
            if let Some(Widget::Decimal(p)) = form.widget_mut(TextKey::DistanceShort) {
                p.set(350.0);
            }
        }
        assert!((distance.get() - 350.0).abs() < f64::EPSILON);
    }

    #[test]
    fn should_select_by_index_and_ignore_out_of_range() {
        let mut select = Select::new(&SIDES, 1u8);
        assert_eq!(select.selected_index(), Some(0));
        select.select_index(1);
        assert_eq!(select.get(), 2);
        select.select_index(9);
        assert_eq!(select.get(), 2);
    }

    #[test]
    fn should_pin_typed_decimal_to_bounds() {
        let mut distance = Parameter::new(200.0, 0.0, 100_000.0, 10.0, NumberFormat::fixed(0));
        let mut widget = Widget::Decimal(&mut distance);

        assert!(widget.enter_decimal(250_000.0));
        assert_eq!(widget.display_value().as_deref(), Some("100000"));

        let mut name = Text::new("home");
        assert!(!Widget::Text(&mut name).enter_decimal(1.0));
        assert_eq!(name.get(), "home");
    }

    #[test]
    fn should_flag_stored_values_outside_widget_range() {
        let mut distance = Parameter::new(-5.0, 0.0, 100_000.0, 10.0, NumberFormat::fixed(0));
        assert!(!Widget::Decimal(&mut distance).is_presentable());
        distance.set(5.0);
        assert!(Widget::Decimal(&mut distance).is_presentable());

        let mut sentinel = Select::new(&SIDES, 0u8);
        assert!(!Widget::Choice(&mut sentinel).is_presentable());
        let mut inside = Select::new(&SIDES, 1u8);
        assert!(Widget::Choice(&mut inside).is_presentable());
    }

    #[test]
    fn should_report_no_index_for_sentinel() {
        let select = Select::new(&SIDES, 0u8);
        assert_eq!(select.selected_index(), None);
        assert_eq!(
            select.labels(),
            vec![TextKey::LocationInside, TextKey::LocationOutside]
        );
    }
}
