//! Database seeding command.
//!
//! Inserts a small beverage catalog plus one admin and one customer
//! account, for local development and manual testing. Re-running is safe:
//! every insert skips rows that already exist.

use rust_decimal::Decimal;

use steeped_core::UserRole;

use super::CommandError;

/// Sample catalog rows: (name, description, price, category, origin).
const CATALOG: &[(&str, &str, &str, &str, &str)] = &[
    (
        "Darjeeling First Flush",
        "Light, floral black tea from the spring harvest.",
        "14.50",
        "tea",
        "India",
    ),
    (
        "Sencha",
        "Grassy, vegetal Japanese green tea.",
        "11.00",
        "tea",
        "Japan",
    ),
    (
        "Yirgacheffe",
        "Bright, citrusy washed-process coffee.",
        "16.00",
        "coffee",
        "Ethiopia",
    ),
    (
        "Monsooned Malabar",
        "Low-acid, full-bodied coffee aged in monsoon winds.",
        "13.25",
        "coffee",
        "India",
    ),
    (
        "Golden Turmeric Latte Mix",
        "Caffeine-free turmeric and ginger blend.",
        "9.75",
        "blend",
        "India",
    ),
    (
        "Masala Chai",
        "Assam base with cardamom, cinnamon and clove.",
        "10.50",
        "blend",
        "India",
    ),
];

/// Seed the database with the sample catalog and accounts.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or an insert fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = super::connect().await?;

    tracing::info!("Seeding accounts...");
    seed_account(
        &pool,
        "admin@steeped.example",
        "admin",
        "Steeped Admin",
        UserRole::Admin,
    )
    .await?;
    seed_account(
        &pool,
        "customer@steeped.example",
        "customer",
        "Sample Customer",
        UserRole::User,
    )
    .await?;

    tracing::info!("Seeding catalog...");
    let mut inserted = 0u32;
    for (name, description, price, category, origin) in CATALOG {
        let price: Decimal = price
            .parse()
            .map_err(|_| sqlx::Error::Decode(format!("bad seed price for {name}").into()))?;

        let result = sqlx::query(
            "INSERT INTO products (name, description, price, category, origin)
             SELECT $1, $2, $3, $4, $5
             WHERE NOT EXISTS (SELECT 1 FROM products WHERE name = $1)",
        )
        .bind(name)
        .bind(description)
        .bind(price)
        .bind(category)
        .bind(origin)
        .execute(&pool)
        .await?;

        inserted += u32::try_from(result.rows_affected()).unwrap_or(0);
    }

    tracing::info!("Seeding complete! {inserted} products inserted");
    Ok(())
}

/// Insert an account unless the email is already taken.
async fn seed_account(
    pool: &sqlx::PgPool,
    email: &str,
    username: &str,
    name: &str,
    role: UserRole,
) -> Result<(), CommandError> {
    let result = sqlx::query(
        "INSERT INTO users (email, username, name, role, is_verified)
         SELECT $1, $2, $3, $4, TRUE
         WHERE NOT EXISTS (SELECT 1 FROM users WHERE email = $1)",
    )
    .bind(email)
    .bind(username)
    .bind(name)
    .bind(role.to_string())
    .execute(pool)
    .await?;

    if result.rows_affected() > 0 {
        tracing::info!("Created {role} account: {email}");
    } else {
        tracing::info!("Account already exists: {email}");
    }
    Ok(())
}
