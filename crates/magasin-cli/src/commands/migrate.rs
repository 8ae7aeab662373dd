//! Schema migration command
//!
//! Usage: magasin migrate [--db <PATH>]

use magasin_store::{db, migrations, Result, StoreConfig};

pub fn execute(config: &StoreConfig) -> Result<()> {
    let mut conn = db::open_with_config(config)?;

    let applied = migrations::apply_migrations(&mut conn)?;
    if applied.is_empty() {
        println!("✓ Schema up to date");
    }
    for migration_id in applied {
        println!("✓ Applied {}", migration_id);
    }

    Ok(())
}
