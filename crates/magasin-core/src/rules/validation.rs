use crate::errors::{MagasinError, Result};
use crate::model::{ArticleLine, Commande, LocalLine, OrderFamily, Stock};

fn check_reference(field: &str, value: i64) -> Result<()> {
    if value <= 0 {
        return Err(MagasinError::InvalidReference {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

/// Validate an order aggregate before handing it to the repository
///
/// Checks that every referenced id is positive and that every article line
/// has a positive quantity. Status transitions are not checked.
///
/// # Errors
/// Returns the first violation found, lines before locations.
pub fn validate_commande<F: OrderFamily>(commande: &Commande<F>) -> Result<()> {
    check_reference("magasinier_id", commande.magasinier_id)?;
    check_reference("contrepartie_id", commande.contrepartie_id)?;
    check_reference("local_id", commande.local_id)?;

    for ligne in &commande.articles {
        check_reference("article_id", ligne.article_id())?;
        if ligne.quantite() <= 0 {
            return Err(MagasinError::InvalidQuantity {
                article_id: ligne.article_id(),
                quantite: ligne.quantite(),
            });
        }
    }

    for ligne in &commande.locaux {
        check_reference("local_id", ligne.local_id())?;
    }

    Ok(())
}

/// Validate a stock level: references positive, quantity not negative
pub fn validate_stock(stock: &Stock) -> Result<()> {
    check_reference("article_id", stock.article_id)?;
    check_reference("local_id", stock.local_id)?;
    if stock.quantite < 0 {
        return Err(MagasinError::InvalidQuantity {
            article_id: stock.article_id,
            quantite: stock.quantite,
        });
    }
    Ok(())
}
