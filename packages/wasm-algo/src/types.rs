//! Shared types for the composer form
//!
//! Field names are the Algorand transaction keys the composer UI binds to
//! (`snd`, `rcv`, `apar_m`, ...), plus a handful of UI toggles.

use crate::error::WasmAlgoError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Transaction type selected in the composer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxnType {
    /// Payment
    Pay,
    /// Asset transfer (send, opt-in, opt-out, clawback)
    Axfer,
    /// Asset configuration (create, reconfigure, destroy)
    Acfg,
    /// Asset freeze
    Afrz,
    /// Application call
    Appl,
    /// Key registration
    Keyreg,
}

impl TxnType {
    pub const ALL: [TxnType; 6] = [
        TxnType::Pay,
        TxnType::Axfer,
        TxnType::Acfg,
        TxnType::Afrz,
        TxnType::Appl,
        TxnType::Keyreg,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TxnType::Pay => "pay",
            TxnType::Axfer => "axfer",
            TxnType::Acfg => "acfg",
            TxnType::Afrz => "afrz",
            TxnType::Appl => "appl",
            TxnType::Keyreg => "keyreg",
        }
    }
}

impl fmt::Display for TxnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TxnType {
    type Err = WasmAlgoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TxnType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| WasmAlgoError::UnknownTxnType(s.to_string()))
    }
}

macro_rules! fields {
    ( $( $(#[$doc:meta])* $variant:ident => $name:literal ),* $(,)? ) => {
        /// Every field any transaction type can carry
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum Field {
            $( $(#[$doc])* $variant ),*
        }

        impl Field {
            pub const ALL: &'static [Field] = &[ $( Field::$variant ),* ];

            /// Wire name used by the UI
            pub fn as_str(self) -> &'static str {
                match self {
                    $( Field::$variant => $name ),*
                }
            }
        }

        impl FromStr for Field {
            type Err = WasmAlgoError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $name => Ok(Field::$variant), )*
                    _ => Err(WasmAlgoError::UnknownField(s.to_string())),
                }
            }
        }
    };
}

fields! {
    /// Sender address
    Snd => "snd",
    /// Fee in Algos
    Fee => "fee",
    /// Use the node's suggested fee instead of `fee`
    UseSugFee => "useSugFee",
    /// First valid round
    Fv => "fv",
    /// Last valid round
    Lv => "lv",
    /// Use the node's suggested validity rounds instead of `fv`/`lv`
    UseSugRounds => "useSugRounds",
    Note => "note",
    /// Rekey-to address
    Rekey => "rekey",

    /// Receiver address (pay, axfer)
    Rcv => "rcv",
    /// Amount (pay in Algos, axfer in asset base units)
    Amt => "amt",
    /// Close-remainder-to address (pay)
    Close => "close",

    /// Asset id to transfer
    Xaid => "xaid",
    /// Clawback target
    Asnd => "asnd",
    /// Asset close-to address
    Aclose => "aclose",

    /// Asset id to configure; empty when creating
    Caid => "caid",
    AparUn => "apar_un",
    AparAn => "apar_an",
    AparT => "apar_t",
    AparDc => "apar_dc",
    AparDf => "apar_df",
    AparAu => "apar_au",
    AparAm => "apar_am",
    AparM => "apar_m",
    AparMUseSnd => "apar_mUseSnd",
    AparF => "apar_f",
    AparFUseSnd => "apar_fUseSnd",
    AparC => "apar_c",
    AparCUseSnd => "apar_cUseSnd",
    AparR => "apar_r",
    AparRUseSnd => "apar_rUseSnd",

    /// Asset id to freeze
    Faid => "faid",
    /// Account to freeze
    Fadd => "fadd",
    /// Freeze (on) or unfreeze (off)
    Afrz => "afrz",

    /// Application id; empty or 0 when creating
    Apid => "apid",
    /// On-completion action
    Apan => "apan",
    /// Approval program (base64)
    Apap => "apap",
    /// Clear state program (base64)
    Apsu => "apsu",
    ApgsNui => "apgs_nui",
    ApgsNbs => "apgs_nbs",
    AplsNui => "apls_nui",
    AplsNbs => "apls_nbs",
    /// Extra program pages
    Apep => "apep",
    /// Application arguments, comma separated
    Apaa => "apaa",
    /// Foreign accounts, comma separated
    Apat => "apat",
    /// Foreign applications, comma separated
    Apfa => "apfa",
    /// Foreign assets, comma separated
    Apas => "apas",

    Votekey => "votekey",
    Selkey => "selkey",
    Sprfkey => "sprfkey",
    Votefst => "votefst",
    Votelst => "votelst",
    Votekd => "votekd",
    /// Mark the account as never participating again
    Nonpart => "nonpart",
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Field {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Declared value kind of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    Text,
    Number,
    Toggle,
}

impl FieldKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Number => "number",
            FieldKind::Toggle => "toggle",
        }
    }

    /// Coerce a raw value from the UI into this kind.
    ///
    /// Empty strings become `None`. Numeric fields also accept numeric
    /// strings, since browser inputs hand values over as text.
    pub fn coerce(
        self,
        field: Field,
        value: Option<FieldValue>,
    ) -> Result<Option<FieldValue>, WasmAlgoError> {
        let mismatch = || WasmAlgoError::KindMismatch {
            field: field.as_str().to_string(),
            expected: self.as_str().to_string(),
        };

        let Some(value) = value else {
            return Ok(None);
        };

        match (self, value) {
            (FieldKind::Text, FieldValue::Text(s)) if s.is_empty() => Ok(None),
            (FieldKind::Text, v @ FieldValue::Text(_)) => Ok(Some(v)),
            (FieldKind::Number, FieldValue::Number(n)) if n.is_finite() => {
                Ok(Some(FieldValue::Number(n)))
            }
            (FieldKind::Number, FieldValue::Text(s)) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Ok(None);
                }
                match trimmed.parse::<f64>() {
                    Ok(n) if n.is_finite() => Ok(Some(FieldValue::Number(n))),
                    _ => Err(mismatch()),
                }
            }
            (FieldKind::Toggle, v @ FieldValue::Toggle(_)) => Ok(Some(v)),
            _ => Err(mismatch()),
        }
    }
}

/// A field value as held in the form
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Toggle(bool),
}

impl FieldValue {
    pub fn text(s: impl Into<String>) -> Self {
        FieldValue::Text(s.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_toggle(&self) -> Option<bool> {
        match self {
            FieldValue::Toggle(b) => Some(*b),
            _ => None,
        }
    }

    /// Empty means "no input": blank text. Numbers and toggles are never empty.
    pub fn is_blank(&self) -> bool {
        matches!(self, FieldValue::Text(s) if s.trim().is_empty())
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Text(s) => serializer.serialize_str(s),
            FieldValue::Number(n) => serializer.serialize_f64(*n),
            FieldValue::Toggle(b) => serializer.serialize_bool(*b),
        }
    }
}

/// Deserialize from a JS string, number or boolean
impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FieldValueVisitor;

        impl<'de> de::Visitor<'de> for FieldValueVisitor {
            type Value = FieldValue;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string, number or boolean")
            }

            fn visit_bool<E>(self, value: bool) -> Result<FieldValue, E>
            where
                E: de::Error,
            {
                Ok(FieldValue::Toggle(value))
            }

            fn visit_u64<E>(self, value: u64) -> Result<FieldValue, E>
            where
                E: de::Error,
            {
                Ok(FieldValue::Number(value as f64))
            }

            fn visit_i64<E>(self, value: i64) -> Result<FieldValue, E>
            where
                E: de::Error,
            {
                Ok(FieldValue::Number(value as f64))
            }

            fn visit_f64<E>(self, value: f64) -> Result<FieldValue, E>
            where
                E: de::Error,
            {
                Ok(FieldValue::Number(value))
            }

            fn visit_str<E>(self, value: &str) -> Result<FieldValue, E>
            where
                E: de::Error,
            {
                Ok(FieldValue::Text(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> Result<FieldValue, E>
            where
                E: de::Error,
            {
                Ok(FieldValue::Text(value))
            }
        }

        deserializer.deserialize_any(FieldValueVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_names_roundtrip() {
        for field in Field::ALL {
            assert_eq!(field.as_str().parse::<Field>().unwrap(), *field);
        }
        assert!("nope".parse::<Field>().is_err());
    }

    #[test]
    fn test_txn_type_from_str() {
        assert_eq!("axfer".parse::<TxnType>().unwrap(), TxnType::Axfer);
        assert_eq!("KeyReg".parse::<TxnType>().unwrap(), TxnType::Keyreg);
        assert!("transfer".parse::<TxnType>().is_err());
    }

    #[test]
    fn test_deserialize_field_value() {
        let v: FieldValue = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(v, FieldValue::text("abc"));
        let v: FieldValue = serde_json::from_str("12").unwrap();
        assert_eq!(v, FieldValue::Number(12.0));
        let v: FieldValue = serde_json::from_str("0.5").unwrap();
        assert_eq!(v, FieldValue::Number(0.5));
        let v: FieldValue = serde_json::from_str("true").unwrap();
        assert_eq!(v, FieldValue::Toggle(true));
        let v: Option<FieldValue> = serde_json::from_str("null").unwrap();
        assert_eq!(v, None);
    }

    #[test]
    fn test_coerce_number_from_text() {
        let coerced = FieldKind::Number
            .coerce(Field::Amt, Some(FieldValue::text(" 1.25 ")))
            .unwrap();
        assert_eq!(coerced, Some(FieldValue::Number(1.25)));

        let coerced = FieldKind::Number
            .coerce(Field::Amt, Some(FieldValue::text("")))
            .unwrap();
        assert_eq!(coerced, None);

        assert!(FieldKind::Number
            .coerce(Field::Amt, Some(FieldValue::text("ten")))
            .is_err());
    }

    #[test]
    fn test_coerce_kind_mismatch() {
        let err = FieldKind::Toggle
            .coerce(Field::Nonpart, Some(FieldValue::Number(1.0)))
            .unwrap_err();
        assert!(matches!(err, WasmAlgoError::KindMismatch { .. }));

        assert!(FieldKind::Text
            .coerce(Field::Snd, Some(FieldValue::Number(1.0)))
            .is_err());
    }

    #[test]
    fn test_coerce_empty_text_is_none() {
        let coerced = FieldKind::Text
            .coerce(Field::Note, Some(FieldValue::text("")))
            .unwrap();
        assert_eq!(coerced, None);
    }
}
