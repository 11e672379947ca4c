//! Account bookkeeping - countries, wallets, bookmaker profiles, templates.
//!
//! Creation, lookup, and edit operations. Deletion lives in
//! [`crate::core::lifecycle`] because removing an account is gated on its
//! derived balance. All lookups exclude soft-deleted rows.

use crate::{
    entities::{Bookmaker, Country, Template, Wallet, bookmaker, country, template, wallet},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Creates a new country.
pub async fn create_country(
    db: &DatabaseConnection,
    name: String,
    flag: String,
) -> Result<country::Model> {
    if name.trim().is_empty() {
        return Err(Error::Config {
            message: "Country name cannot be empty".to_string(),
        });
    }

    let model = country::ActiveModel {
        name: Set(name.trim().to_string()),
        flag: Set(flag),
        is_deleted: Set(false),
        ..Default::default()
    };

    Ok(model.insert(db).await?)
}

/// Retrieves all active (non-deleted) countries, ordered alphabetically by name.
pub async fn get_countries(db: &DatabaseConnection) -> Result<Vec<country::Model>> {
    Country::find()
        .filter(country::Column::IsDeleted.eq(false))
        .order_by_asc(country::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a country by id, returning None if missing or deleted.
pub async fn get_country_by_id<C>(db: &C, country_id: i64) -> Result<Option<country::Model>>
where
    C: ConnectionTrait,
{
    Country::find_by_id(country_id)
        .filter(country::Column::IsDeleted.eq(false))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a bookmaker-profile template for a country.
pub async fn create_template(
    db: &DatabaseConnection,
    name: String,
    salary_percentage: f64,
    country_id: Option<i64>,
) -> Result<template::Model> {
    if name.trim().is_empty() {
        return Err(Error::Config {
            message: "Template name cannot be empty".to_string(),
        });
    }
    if !salary_percentage.is_finite() || salary_percentage < 0.0 {
        return Err(Error::InvalidAmount {
            amount: salary_percentage,
        });
    }

    let model = template::ActiveModel {
        name: Set(name.trim().to_string()),
        salary_percentage: Set(salary_percentage),
        country_id: Set(country_id),
        is_deleted: Set(false),
        ..Default::default()
    };

    Ok(model.insert(db).await?)
}

/// Retrieves the active templates of one country.
pub async fn get_templates_by_country(
    db: &DatabaseConnection,
    country_id: i64,
) -> Result<Vec<template::Model>> {
    Template::find()
        .filter(template::Column::CountryId.eq(country_id))
        .filter(template::Column::IsDeleted.eq(false))
        .order_by_asc(template::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a template by id, returning None if missing or deleted.
pub async fn get_template_by_id(
    db: &DatabaseConnection,
    template_id: i64,
) -> Result<Option<template::Model>> {
    Template::find_by_id(template_id)
        .filter(template::Column::IsDeleted.eq(false))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a new wallet with the given opening deposit.
pub async fn create_wallet(
    db: &DatabaseConnection,
    name: String,
    wallet_kind: String,
    deposit: f64,
    country_id: Option<i64>,
) -> Result<wallet::Model> {
    if name.trim().is_empty() {
        return Err(Error::Config {
            message: "Wallet name cannot be empty".to_string(),
        });
    }
    if !deposit.is_finite() {
        return Err(Error::InvalidAmount { amount: deposit });
    }

    let model = wallet::ActiveModel {
        name: Set(name.trim().to_string()),
        wallet_kind: Set(wallet_kind),
        deposit: Set(deposit),
        adjustment: Set(0.0),
        country_id: Set(country_id),
        is_deleted: Set(false),
        ..Default::default()
    };

    Ok(model.insert(db).await?)
}

/// Retrieves all active wallets, ordered alphabetically by name.
pub async fn get_wallets(db: &DatabaseConnection) -> Result<Vec<wallet::Model>> {
    Wallet::find()
        .filter(wallet::Column::IsDeleted.eq(false))
        .order_by_asc(wallet::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the active wallets of one country.
pub async fn get_wallets_by_country(
    db: &DatabaseConnection,
    country_id: i64,
) -> Result<Vec<wallet::Model>> {
    Wallet::find()
        .filter(wallet::Column::CountryId.eq(country_id))
        .filter(wallet::Column::IsDeleted.eq(false))
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a wallet by id, returning None if missing or deleted.
pub async fn get_wallet_by_id<C>(db: &C, wallet_id: i64) -> Result<Option<wallet::Model>>
where
    C: ConnectionTrait,
{
    Wallet::find_by_id(wallet_id)
        .filter(wallet::Column::IsDeleted.eq(false))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Applies a manual correction to a wallet by atomically adding to its
/// `adjustment`.
///
/// Uses a single SQL UPDATE (`adjustment = adjustment + delta`) so concurrent
/// corrections cannot lose each other's update.
pub async fn adjust_wallet<C>(db: &C, wallet_id: i64, delta: f64) -> Result<wallet::Model>
where
    C: ConnectionTrait,
{
    use sea_orm::sea_query::Expr;

    if !delta.is_finite() {
        return Err(Error::InvalidAmount { amount: delta });
    }

    get_wallet_by_id(db, wallet_id)
        .await?
        .ok_or_else(|| Error::not_found("wallet", wallet_id))?;

    Wallet::update_many()
        .col_expr(
            wallet::Column::Adjustment,
            Expr::col(wallet::Column::Adjustment).add(delta),
        )
        .filter(wallet::Column::Id.eq(wallet_id))
        .exec(db)
        .await?;

    get_wallet_by_id(db, wallet_id)
        .await?
        .ok_or_else(|| Error::not_found("wallet", wallet_id))
}

/// Creates a bookmaker profile directly, without a template.
pub async fn create_bookmaker(
    db: &DatabaseConnection,
    name: String,
    bk_name: String,
    salary_percentage: f64,
    country_id: Option<i64>,
) -> Result<bookmaker::Model> {
    if name.trim().is_empty() {
        return Err(Error::Config {
            message: "Profile name cannot be empty".to_string(),
        });
    }
    if !salary_percentage.is_finite() || salary_percentage < 0.0 {
        return Err(Error::InvalidAmount {
            amount: salary_percentage,
        });
    }

    let model = bookmaker::ActiveModel {
        name: Set(name.trim().to_string()),
        bk_name: Set(bk_name),
        salary_percentage: Set(salary_percentage),
        country_id: Set(country_id),
        template_id: Set(None),
        is_active: Set(true),
        deactivated_at: Set(None),
        is_deleted: Set(false),
        ..Default::default()
    };

    Ok(model.insert(db).await?)
}

/// Creates a bookmaker profile from a template: the brand name and default
/// salary percentage are inherited.
pub async fn create_bookmaker_from_template(
    db: &DatabaseConnection,
    profile_name: String,
    template_id: i64,
    country_id: i64,
) -> Result<bookmaker::Model> {
    let template = get_template_by_id(db, template_id)
        .await?
        .ok_or_else(|| Error::not_found("template", template_id))?;
    get_country_by_id(db, country_id)
        .await?
        .ok_or_else(|| Error::not_found("country", country_id))?;

    let model = bookmaker::ActiveModel {
        name: Set(profile_name.trim().to_string()),
        bk_name: Set(template.name),
        salary_percentage: Set(template.salary_percentage),
        country_id: Set(Some(country_id)),
        template_id: Set(Some(template_id)),
        is_active: Set(true),
        deactivated_at: Set(None),
        is_deleted: Set(false),
        ..Default::default()
    };

    Ok(model.insert(db).await?)
}

/// Retrieves all active bookmaker profiles, ordered alphabetically by name.
pub async fn get_bookmakers(db: &DatabaseConnection) -> Result<Vec<bookmaker::Model>> {
    Bookmaker::find()
        .filter(bookmaker::Column::IsDeleted.eq(false))
        .order_by_asc(bookmaker::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the active bookmaker profiles of one country.
pub async fn get_bookmakers_by_country(
    db: &DatabaseConnection,
    country_id: i64,
) -> Result<Vec<bookmaker::Model>> {
    Bookmaker::find()
        .filter(bookmaker::Column::CountryId.eq(country_id))
        .filter(bookmaker::Column::IsDeleted.eq(false))
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a bookmaker profile by id, returning None if missing or deleted.
pub async fn get_bookmaker_by_id<C>(db: &C, bookmaker_id: i64) -> Result<Option<bookmaker::Model>>
where
    C: ConnectionTrait,
{
    Bookmaker::find_by_id(bookmaker_id)
        .filter(bookmaker::Column::IsDeleted.eq(false))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Renames a bookmaker profile.
pub async fn rename_bookmaker(
    db: &DatabaseConnection,
    bookmaker_id: i64,
    new_name: String,
) -> Result<bookmaker::Model> {
    let bookmaker = get_bookmaker_by_id(db, bookmaker_id)
        .await?
        .ok_or_else(|| Error::not_found("bookmaker", bookmaker_id))?;

    let mut active: bookmaker::ActiveModel = bookmaker.into();
    active.name = Set(new_name.trim().to_string());
    Ok(active.update(db).await?)
}

/// Changes the default salary percentage of a bookmaker profile.
pub async fn set_bookmaker_percentage(
    db: &DatabaseConnection,
    bookmaker_id: i64,
    new_percentage: f64,
) -> Result<bookmaker::Model> {
    if !new_percentage.is_finite() || new_percentage < 0.0 {
        return Err(Error::InvalidAmount {
            amount: new_percentage,
        });
    }

    let bookmaker = get_bookmaker_by_id(db, bookmaker_id)
        .await?
        .ok_or_else(|| Error::not_found("bookmaker", bookmaker_id))?;

    let mut active: bookmaker::ActiveModel = bookmaker.into();
    active.salary_percentage = Set(new_percentage);
    Ok(active.update(db).await?)
}
