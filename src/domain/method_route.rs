//! Static routing from contract method names to expected events.
//!
//! Each routed method emits exactly one event name of interest and maps
//! that event's data fields onto one record kind. The table is fixed at
//! compile time.

use super::records::RecordKind;

/// Record field an event data key is copied into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordField {
    /// Account the event concerns.
    AccountId,
    /// Token contract id.
    Asset,
    /// Integer token amount; contributes to deposits or withdraws.
    Amount,
    /// Account being liquidated.
    LiquidatedId,
    /// Decimal collateral value; contributes to the liquidate total.
    CollateralSum,
    /// Decimal repaid value; stored only.
    RepaidSum,
}

/// One `data` key → record field pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMapping {
    /// Key inside the event's data object.
    pub source: &'static str,
    /// Record field it populates.
    pub target: RecordField,
}

/// What a routed method produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventSpec {
    /// Contract method that emits the event.
    pub method_name: &'static str,
    /// Event name the method's logs must carry.
    pub event_name: &'static str,
    /// Record kind built from a matching event.
    pub kind: RecordKind,
    /// Data keys copied onto the record.
    pub fields: &'static [FieldMapping],
}

const fn map(source: &'static str, target: RecordField) -> FieldMapping {
    FieldMapping { source, target }
}

const TOKEN_FIELDS: &[FieldMapping] = &[
    map("account_id", RecordField::AccountId),
    map("token_id", RecordField::Asset),
    map("amount", RecordField::Amount),
];

const LIQUIDATE_FIELDS: &[FieldMapping] = &[
    map("account_id", RecordField::AccountId),
    map("liquidation_account_id", RecordField::LiquidatedId),
    map("collateral_sum", RecordField::CollateralSum),
    map("repaid_sum", RecordField::RepaidSum),
];

/// Every routed method.
pub const ROUTES: &[EventSpec] = &[
    EventSpec {
        method_name: "ft_on_transfer",
        event_name: "deposit",
        kind: RecordKind::Deposit,
        fields: TOKEN_FIELDS,
    },
    EventSpec {
        method_name: "after_ft_transfer",
        event_name: "withdraw_succeeded",
        kind: RecordKind::Withdraw,
        fields: TOKEN_FIELDS,
    },
    EventSpec {
        method_name: "oracle_on_call",
        event_name: "liquidate",
        kind: RecordKind::Liquidate,
        fields: LIQUIDATE_FIELDS,
    },
];

/// Looks up the event spec for a method name.
#[must_use]
pub fn route(method_name: &str) -> Option<&'static EventSpec> {
    ROUTES.iter().find(|spec| spec.method_name == method_name)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn routes_known_methods() {
        let Some(spec) = route("ft_on_transfer") else {
            panic!("ft_on_transfer is routed");
        };
        assert_eq!(spec.event_name, "deposit");
        assert_eq!(spec.kind, RecordKind::Deposit);

        let Some(spec) = route("after_ft_transfer") else {
            panic!("after_ft_transfer is routed");
        };
        assert_eq!(spec.event_name, "withdraw_succeeded");
        assert_eq!(spec.kind, RecordKind::Withdraw);

        let Some(spec) = route("oracle_on_call") else {
            panic!("oracle_on_call is routed");
        };
        assert_eq!(spec.event_name, "liquidate");
        assert_eq!(spec.kind, RecordKind::Liquidate);
    }

    #[test]
    fn unknown_methods_are_not_routed() {
        assert!(route("ft_transfer").is_none());
        assert!(route("").is_none());
        assert!(route("FT_ON_TRANSFER").is_none());
    }

    #[test]
    fn liquidate_maps_renamed_keys() {
        let Some(spec) = route("oracle_on_call") else {
            panic!("oracle_on_call is routed");
        };
        let sources: Vec<_> = spec.fields.iter().map(|f| f.source).collect();
        assert_eq!(
            sources,
            ["account_id", "liquidation_account_id", "collateral_sum", "repaid_sum"]
        );
    }

    #[test]
    fn token_methods_map_token_id_to_asset() {
        for method in ["ft_on_transfer", "after_ft_transfer"] {
            let Some(spec) = route(method) else {
                panic!("{method} is routed");
            };
            assert!(
                spec.fields
                    .iter()
                    .any(|f| f.source == "token_id" && f.target == RecordField::Asset)
            );
        }
    }
}
