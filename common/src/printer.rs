//! Human-readable rendering of decoded values. Reads data only, never the
//! wire format.

use std::{
    any::{Any, TypeId},
    collections::HashMap,
};

type Override = Box<dyn Fn(&dyn Any) -> Option<String> + Send + Sync>;

/// Renders typed values as text, with per-type and per-field overrides.
#[derive(Default)]
pub struct Printer {
    types: HashMap<TypeId, Override>,
    fields: HashMap<&'static str, Override>,
}

impl Printer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders every value of type `T` with `print`.
    pub fn with_type<T: Any>(
        mut self,
        print: impl Fn(&T) -> String + Send + Sync + 'static,
    ) -> Self {
        self.types.insert(TypeId::of::<T>(), wrap(print));
        self
    }

    /// Renders the field named `field` with `print`; wins over a type
    /// override. A name bound to the wrong type falls through silently.
    pub fn with_field<T: Any>(
        mut self,
        field: &'static str,
        print: impl Fn(&T) -> String + Send + Sync + 'static,
    ) -> Self {
        self.fields.insert(field, wrap(print));
        self
    }

    pub fn print<T: Print>(&self, value: &T) -> String {
        let mut out = String::new();
        self.print_value(value, None, 0, &mut out);
        out
    }

    /// Lookup order: field override, then type override, then the value's own
    /// rendering.
    pub fn print_value<T: Print>(
        &self,
        value: &T,
        field: Option<&str>,
        indent: usize,
        out: &mut String,
    ) {
        if let Some(print) = field.and_then(|name| self.fields.get(name)) {
            if let Some(rendered) = print(value) {
                out.push_str(&rendered);
                return;
            }
        }
        if let Some(rendered) = self.types.get(&value.type_id()).and_then(|print| print(value)) {
            out.push_str(&rendered);
            return;
        }
        value.print(self, indent, out);
    }
}

fn wrap<T: Any>(print: impl Fn(&T) -> String + Send + Sync + 'static) -> Override {
    Box::new(move |value| value.downcast_ref::<T>().map(&print))
}

/// Text rendering used by [`Printer`]. Composite impls come out of
/// [`record!`](crate::record!): the type name, then one indented
/// `field = value` line per field.
pub trait Print: Any {
    fn print(&self, printer: &Printer, indent: usize, out: &mut String);
}

macro_rules! print_via_display {
    ($($ty:ty),* $(,)?) => {$(
        impl Print for $ty {
            fn print(&self, _: &Printer, _: usize, out: &mut String) {
                out.push_str(&self.to_string());
            }
        }
    )*};
}

print_via_display!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64, bool);

impl Print for String {
    fn print(&self, _: &Printer, _: usize, out: &mut String) {
        out.push('"');
        out.push_str(self);
        out.push('"');
    }
}

impl<T: Print> Print for Option<T> {
    fn print(&self, printer: &Printer, indent: usize, out: &mut String) {
        match self {
            None => out.push_str("null"),
            Some(value) => printer.print_value(value, None, indent, out),
        }
    }
}

impl<T: Print> Print for Box<T> {
    fn print(&self, printer: &Printer, indent: usize, out: &mut String) {
        printer.print_value(&**self, None, indent, out);
    }
}

impl<T: Print> Print for Vec<T> {
    fn print(&self, printer: &Printer, indent: usize, out: &mut String) {
        out.push('[');
        for (index, element) in self.iter().enumerate() {
            if index > 0 {
                out.push_str(", ");
            }
            printer.print_value(element, None, indent, out);
        }
        out.push(']');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::record! {
        #[derive(Debug, Default, Clone, PartialEq)]
        struct Badge {
            id: i32,
            owner: String,
            scores: Vec<f64>,
        }
    }

    fn badge() -> Badge {
        Badge {
            id: 17,
            owner: "ada".to_owned(),
            scores: vec![1.5, 2.0],
        }
    }

    #[test]
    fn records_render_one_line_per_field() {
        let text = Printer::new().print(&badge());
        assert_eq!(text, "Badge\n\tid = 17\n\towner = \"ada\"\n\tscores = [1.5, 2]");
    }

    #[test]
    fn type_override_applies_everywhere() {
        let text = Printer::new()
            .with_type::<f64>(|value| format!("{value:.3}"))
            .print(&badge());
        assert!(text.contains("[1.500, 2.000]"));
    }

    #[test]
    fn field_override_beats_type_override() {
        let text = Printer::new()
            .with_type::<i32>(|_| "type".to_owned())
            .with_field::<i32>("id", |_| "field".to_owned())
            .print(&badge());
        assert!(text.contains("id = field"));
    }

    #[test]
    fn mistyped_field_override_falls_through() {
        let text = Printer::new()
            .with_field::<String>("id", |_| "never".to_owned())
            .print(&badge());
        assert!(text.contains("id = 17"));
    }

    #[test]
    fn absent_options_render_as_null() {
        let mut out = String::new();
        Printer::new().print_value(&None::<i32>, None, 0, &mut out);
        assert_eq!(out, "null");
    }
}
