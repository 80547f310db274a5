/// Builds a [`Field`](crate::Field) bound to a struct member.
///
/// The JSON name defaults to the member name; pass a string literal first to
/// override it.
///
/// ```rust
/// use json_descriptor::{field, Descriptor, Host};
///
/// #[derive(Default)]
/// struct User { id: u64, display_name: String }
/// impl Host for User {}
///
/// let id = field!(User, id, Descriptor::number());
/// let name = field!("displayName", User, display_name, Descriptor::string());
/// assert_eq!(id.name(), "id");
/// assert_eq!(name.name(), "displayName");
/// ```
#[macro_export]
macro_rules! field {
    (@bind $name:expr, $ty:ty, $member:tt, $desc:expr) => {
        $crate::Field::new(
            $name,
            $crate::Accessor::new(|v: &$ty| &v.$member, |v: &mut $ty| &mut v.$member),
            $desc,
        )
    };

    ($ty:ty, $member:ident, $desc:expr $(,)?) => {
        $crate::field!(@bind stringify!($member), $ty, $member, $desc)
    };

    ($name:literal, $ty:ty, $member:tt, $desc:expr $(,)?) => {
        $crate::field!(@bind $name, $ty, $member, $desc)
    };
}

/// Builds an [`Element`](crate::Element) bound to a struct or tuple member.
///
/// ```rust
/// use json_descriptor::{element, to_string, Descriptor};
///
/// let pair = Descriptor::element_list(vec![
///     element!((String, u8), 0, Descriptor::string()),
///     element!((String, u8), 1, Descriptor::number()),
/// ]);
/// assert_eq!(to_string(&("a".to_string(), 1u8), &pair), r#"["a",1]"#);
/// ```
#[macro_export]
macro_rules! element {
    ($ty:ty, $member:tt, $desc:expr $(,)?) => {
        $crate::Element::new(
            $crate::Accessor::new(|v: &$ty| &v.$member, |v: &mut $ty| &mut v.$member),
            $desc,
        )
    };
}

/// Builds a field-list descriptor from `Type { member: descriptor, ... }`.
///
/// Expands to a [`Descriptor::field_list`](crate::Descriptor::field_list)
/// call.
///
/// ```rust
/// use json_descriptor::{field_list, from_str, Descriptor, Host};
///
/// #[derive(Default, Debug, PartialEq)]
/// struct Point { x: i32, y: i32 }
/// impl Host for Point {}
///
/// let desc = field_list!(Point { x: Descriptor::number(), y: Descriptor::number() });
/// let p: Point = from_str(r#"{"y": 2, "x": 1}"#, &desc).unwrap();
/// assert_eq!(p, Point { x: 1, y: 2 });
/// ```
#[macro_export]
macro_rules! field_list {
    ($ty:ty { $($member:ident : $desc:expr),* $(,)? }) => {
        $crate::Descriptor::field_list(vec![$($crate::field!($ty, $member, $desc)),*])
    };
}

#[cfg(test)]
mod tests {
    use crate::{Descriptor, Host};

    #[derive(Default, Debug, PartialEq)]
    struct Sample {
        flag: bool,
        label: String,
    }

    impl Host for Sample {}

    #[test]
    fn test_field_macro_uses_member_name() {
        let field = field!(Sample, flag, Descriptor::boolean());
        assert_eq!(field.name(), "flag");
        assert!(field.accessor().source_type().ends_with("Sample"));
    }

    #[test]
    fn test_field_macro_renamed() {
        let field = field!("tag", Sample, label, Descriptor::string());
        assert_eq!(field.name(), "tag");

        let sample = Sample {
            flag: false,
            label: "x".to_string(),
        };
        assert!(field.accessor().get(&sample).unwrap().text().is_some());
    }

    #[test]
    fn test_element_macro_tuple_index() {
        let element = element!((i32, bool), 1, Descriptor::boolean());
        let mut pair = (0, false);
        *element.accessor().get_mut(&mut pair).unwrap().boolean_mut().unwrap() = true;
        assert_eq!(pair, (0, true));
    }

    #[test]
    fn test_field_list_macro_keeps_declaration_order() {
        let desc = field_list!(Sample {
            label: Descriptor::string(),
            flag: Descriptor::boolean(),
        });
        let sample = Sample {
            flag: true,
            label: "a".to_string(),
        };
        assert_eq!(crate::to_string(&sample, &desc), r#"{"label":"a","flag":true}"#);
    }
}
