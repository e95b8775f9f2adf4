use accrue_core::error::AccrueError;
use accrue_state::StateDb;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::payment::MemoryPaymentAsset;
use crate::token::PayoutToken;

// Meta keys for the token parts the engine trees do not cover.
const SETTINGS_KEY: &str = "token.settings";
const LEDGER_KEY: &str = "token.ledger";
const LOCKUPS_KEY: &str = "token.lockups";
const ROLES_KEY: &str = "token.roles";
const PAYMENT_KEY: &str = "token.payment";
const NATIVE_KEY: &str = "token.native";

fn put<T: Serialize>(db: &StateDb, key: &str, value: &T) -> Result<(), AccrueError> {
    let bytes = bincode::serialize(value).map_err(|e| AccrueError::Serialization(e.to_string()))?;
    db.put_meta(key, &bytes)
}

fn get<T: DeserializeOwned>(db: &StateDb, key: &str) -> Result<T, AccrueError> {
    let bytes = db
        .get_meta(key)?
        .ok_or_else(|| AccrueError::Storage(format!("missing {}", key)))?;
    bincode::deserialize(&bytes).map_err(|e| AccrueError::Serialization(e.to_string()))
}

/// Persist the whole token and flush.
pub fn save_token(db: &StateDb, token: &PayoutToken<MemoryPaymentAsset>) -> Result<(), AccrueError> {
    db.save_engine(&token.engine)?;
    put(db, LEDGER_KEY, &token.ledger)?;
    put(db, LOCKUPS_KEY, &token.lockups)?;
    put(db, ROLES_KEY, &token.gate)?;
    put(db, PAYMENT_KEY, &token.payment)?;
    put(db, NATIVE_KEY, &token.native)?;
    // Written last: its presence marks a complete save.
    put(db, SETTINGS_KEY, &token.settings)?;
    db.flush()?;
    debug!(epoch = token.engine.current_epoch(), "token state saved");
    Ok(())
}

/// Load a previously saved token, or `None` if the database holds none.
pub fn load_token(db: &StateDb) -> Result<Option<PayoutToken<MemoryPaymentAsset>>, AccrueError> {
    if db.get_meta(SETTINGS_KEY)?.is_none() {
        return Ok(None);
    }
    let token = PayoutToken::from_parts(
        get(db, SETTINGS_KEY)?,
        get(db, LEDGER_KEY)?,
        db.load_engine()?,
        get(db, LOCKUPS_KEY)?,
        get(db, ROLES_KEY)?,
        get(db, PAYMENT_KEY)?,
        get(db, NATIVE_KEY)?,
    );
    Ok(Some(token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TokenConfig;
    use accrue_core::interfaces::{BalanceLedger, PaymentAsset};
    use accrue_core::types::AccountId;

    fn temp_db(name: &str) -> StateDb {
        let dir = std::env::temp_dir().join(format!("accrue_token_test_{}", name));
        let _ = std::fs::remove_dir_all(&dir);
        StateDb::open(&dir).expect("open temp db")
    }

    #[test]
    fn empty_db_has_no_token() {
        let db = temp_db("empty");
        assert!(load_token(&db).unwrap().is_none());
    }

    #[test]
    fn token_round_trips_through_db() {
        let db = temp_db("roundtrip");
        let config = TokenConfig::from_json_str(
            r#"{"name":"Acme","vault":"vault","admins":["admin"],"fee_bps":500,"payment_decimals":18}"#,
        )
        .unwrap();
        let (admin, alice, vault) =
            (AccountId::from_label("admin"), AccountId::from_label("alice"), AccountId::from_label("vault"));

        let mut token =
            PayoutToken::from_config(&config, MemoryPaymentAsset::new(18), MemoryPaymentAsset::native()).unwrap();
        token.payment_mut().fund(&vault, 1_000).unwrap();
        token.mint(&admin, &alice, 4, 1_700_000_000).unwrap();
        token.announce_distribution(&admin, 80, 1_700_000_100).unwrap();
        save_token(&db, &token).unwrap();

        let mut loaded = load_token(&db).unwrap().expect("saved token");
        assert_eq!(loaded.settings(), token.settings());
        assert_eq!(loaded.engine(), token.engine());
        assert_eq!(loaded.lockups(), token.lockups());
        assert_eq!(loaded.ledger().balance_of(&alice), 4);
        assert_eq!(loaded.payment().decimals(), 18);
        assert_eq!(loaded.payment().balance_of(&vault), 1_000);
        assert_eq!(loaded.query_pending(&alice).unwrap(), 80);
    }
}
