//! Newtype IDs for type-safe entity references.
//!
//! Every Atomo row is identified by a client-generated string (a UUID v4 in
//! its hyphenated text form). The same string is used locally and remotely,
//! so ids are never reassigned after creation.

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - `generate()` for fresh client-side ids, `new()`, `as_str()`
/// - `From<String>`, `From<&str>` and `Into<String>` implementations
/// - a transparent `sqlx::Type` (with the `sqlite` feature)
///
/// # Example
///
/// ```rust
/// # use atomo_core::define_id;
/// define_id!(MenuId);
/// define_id!(ShopId);
///
/// let menu_id = MenuId::new("menu_1");
/// let shop_id = ShopId::generate();
///
/// // These are different types, so this won't compile:
/// // let _: MenuId = shop_id;
/// # let _ = (menu_id, shop_id);
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[cfg_attr(feature = "sqlite", derive(::sqlx::Type), sqlx(transparent))]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an existing identifier.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a fresh client-side identifier.
            #[must_use]
            pub fn generate() -> Self {
                Self(::uuid::Uuid::new_v4().to_string())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(ProfileId);
define_id!(MenuId);
define_id!(MenuCategoryId);
define_id!(DishId);
define_id!(ShopId);
define_id!(ShopCategoryId);
define_id!(ProductId);
define_id!(PortfolioId);
define_id!(PortfolioItemId);
define_id!(CvId);
define_id!(CvEducationId);
define_id!(CvExperienceId);
define_id!(CvSkillId);
define_id!(InvitationId);
define_id!(InvitationResponseId);
define_id!(PlanId);
define_id!(SubscriptionId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        let a = MenuId::generate();
        let b = MenuId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 36);
    }

    #[test]
    fn test_id_serializes_transparently() {
        let id = ProfileId::new("user_1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"user_1\"");

        let back: ProfileId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_id_display() {
        assert_eq!(ShopId::from("shop_9").to_string(), "shop_9");
    }
}
