use std::fmt;
use std::hash::Hash;

use crate::error::RegistryError;

/// Identifier capability of an enumerated strategy domain.
///
/// Every member exposes a stable `code` (unique within the domain, suitable for
/// persistence and external reference) and a human-readable `desc`. Declare
/// domains with [`strategy_kind!`](crate::strategy_kind).
pub trait StrategyKind: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static {
    /// Code type: numeric or textual.
    type Code: Copy + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static;

    fn code(&self) -> Self::Code;

    fn desc(&self) -> &'static str;

    /// Every member of the domain.
    fn variants() -> &'static [Self];

    /// Short domain name used in error messages.
    fn domain() -> &'static str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }

    /// Member whose code is `code`.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::UnknownCode` if no member has that code.
    fn from_code(code: Self::Code) -> Result<Self, RegistryError> {
        Self::variants()
            .iter()
            .copied()
            .find(|kind| kind.code() == code)
            .ok_or_else(|| RegistryError::UnknownCode {
                domain: Self::domain(),
                code: code.to_string(),
            })
    }

    /// Whether no two members share a code.
    fn codes_are_unique() -> bool {
        let variants = Self::variants();
        variants
            .iter()
            .enumerate()
            .all(|(i, a)| variants[i + 1..].iter().all(|b| a.code() != b.code()))
    }
}

/// Declare a strategy identifier enum.
///
/// Each variant is given as `Name = (code, "description")`. The macro derives
/// `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq` and `Hash`, implements
/// [`StrategyKind`](crate::strategy::StrategyKind), and implements `Display`
/// with the description.
///
/// ```
/// use winter_core::strategy::StrategyKind;
///
/// winter_core::strategy_kind! {
///     pub enum Channel: u16 {
///         Sms = (1, "short message"),
///         Mail = (2, "e-mail"),
///     }
/// }
///
/// assert_eq!(Channel::Mail.code(), 2);
/// assert_eq!(Channel::from_code(1).unwrap(), Channel::Sms);
/// ```
#[macro_export]
macro_rules! strategy_kind {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $code_ty:ty {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident = ($code:expr, $desc:expr)
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant,
            )+
        }

        impl $crate::strategy::StrategyKind for $name {
            type Code = $code_ty;

            fn code(&self) -> Self::Code {
                match self {
                    $(Self::$variant => $code,)+
                }
            }

            fn desc(&self) -> &'static str {
                match self {
                    $(Self::$variant => $desc,)+
                }
            }

            fn variants() -> &'static [Self] {
                &[$(Self::$variant,)+]
            }

            fn domain() -> &'static str {
                stringify!($name)
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::strategy::StrategyKind::desc(self))
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::strategy_kind! {
        /// Payment channels used by the tests.
        pub enum PayKind: i32 {
            Card = (1, "bank card"),
            Wallet = (2, "digital wallet"),
            Transfer = (3, "bank transfer"),
        }
    }

    crate::strategy_kind! {
        enum Region: &'static str {
            Eu = ("eu", "Europe"),
            Us = ("us", "United States"),
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Clashing {
        A,
        B,
    }

    impl StrategyKind for Clashing {
        type Code = u8;

        fn code(&self) -> u8 {
            7
        }

        fn desc(&self) -> &'static str {
            match self {
                Clashing::A => "a",
                Clashing::B => "b",
            }
        }

        fn variants() -> &'static [Self] {
            &[Clashing::A, Clashing::B]
        }
    }

    #[test]
    fn macro_exposes_code_and_desc() {
        assert_eq!(PayKind::Wallet.code(), 2);
        assert_eq!(PayKind::Wallet.desc(), "digital wallet");
        assert_eq!(PayKind::Transfer.to_string(), "bank transfer");
        assert_eq!(PayKind::variants().len(), 3);
        assert_eq!(PayKind::domain(), "PayKind");
    }

    #[test]
    fn from_code_finds_member() {
        assert_eq!(PayKind::from_code(3).unwrap(), PayKind::Transfer);
        assert_eq!(Region::from_code("us").unwrap(), Region::Us);
    }

    #[test]
    fn from_code_rejects_unknown() {
        let err = PayKind::from_code(42).unwrap_err();
        assert_eq!(
            err,
            RegistryError::UnknownCode {
                domain: "PayKind",
                code: "42".to_string(),
            }
        );
        assert!(Region::from_code("apac").is_err());
    }

    #[test]
    fn default_domain_uses_type_name() {
        assert_eq!(Clashing::domain(), "Clashing");
    }

    #[test]
    fn code_uniqueness_check() {
        assert!(PayKind::codes_are_unique());
        assert!(Region::codes_are_unique());
        assert!(!Clashing::codes_are_unique());
    }
}
