//! Seed the database with demo catalog and account data.
//!
//! Facet values are fixed lists; products get real Stripe mirrors (so the
//! checkout flow works against seeded data) with randomized prices and
//! stock. Seeded users are created active with a shared development
//! password.

use chrono::{TimeZone, Utc};
use rand::Rng;
use rand::seq::IndexedRandom;

use wardrobe_core::{BrandId, ClothesTypeId, Email, Role, SizeId, TargetId};

use wardrobe_api::db::attributes::AttributeRepository;
use wardrobe_api::db::products::{NewProduct, ProductRepository};
use wardrobe_api::db::users::{NewUser, UserRepository};
use wardrobe_api::services::passwords::hash_password;

const SIZE_NAMES: [&str; 5] = ["S", "M", "L", "XL", "XXL"];
const TARGET_NAMES: [&str; 3] = ["mens", "womens", "kids"];
const CLOTHES_TYPE_NAMES: [&str; 4] = ["shirt", "pants", "jacket", "outerwear"];
const BRAND_NAMES: [&str; 5] = ["CHANEL", "NIKE", "UNIQLO", "GU", "SHEIN"];
const CATEGORY_NAMES: [&str; 2] = ["clothing", "catalog"];

const ADJECTIVES: [&str; 8] = [
    "Classic", "Relaxed", "Tailored", "Vintage", "Cropped", "Oversized", "Slim", "Boxy",
];

/// Password for every seeded demo account.
const DEMO_PASSWORD: &str = "wardrobe-demo-pass";

/// Seed facets, products, and users.
///
/// # Errors
///
/// Returns an error if the database, Stripe, or hashing fails.
pub async fn run(product_count: u32, user_count: u32) -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;
    let stripe = super::stripe_client()?;

    // Facet values are get-or-create: re-running the seeder is harmless.
    for (repo, names) in [
        (AttributeRepository::sizes(&pool), &SIZE_NAMES[..]),
        (AttributeRepository::targets(&pool), &TARGET_NAMES[..]),
        (
            AttributeRepository::clothes_types(&pool),
            &CLOTHES_TYPE_NAMES[..],
        ),
        (AttributeRepository::brands(&pool), &BRAND_NAMES[..]),
    ] {
        let existing: Vec<String> = repo.list().await?.into_iter().map(|a| a.name).collect();
        for name in names {
            if !existing.iter().any(|n| n == name) {
                repo.create(name).await?;
            }
        }
    }
    tracing::info!("Facets seeded");

    let sizes = AttributeRepository::sizes(&pool).list().await?;
    let targets = AttributeRepository::targets(&pool).list().await?;
    let clothes_types = AttributeRepository::clothes_types(&pool).list().await?;
    let brands = AttributeRepository::brands(&pool).list().await?;

    let products = ProductRepository::new(&pool);
    let release_date = Utc
        .with_ymd_and_hms(2018, 12, 5, 0, 0, 0)
        .single()
        .ok_or("invalid seed release date")?;

    let mut rng = rand::rng();
    for index in 0..product_count {
        let clothes_type = clothes_types
            .choose(&mut rng)
            .ok_or("no clothes types seeded")?;
        let adjective = ADJECTIVES.choose(&mut rng).ok_or("no adjectives")?;
        let name = format!("{adjective} {} #{index}", clothes_type.name);
        let price = i64::from(rng.random_range(1..=10_000u32));

        let stripe_product_id = stripe.create_product(&name, price).await?;

        let new = NewProduct {
            size_id: SizeId::new(sizes.choose(&mut rng).ok_or("no sizes seeded")?.id),
            target_id: TargetId::new(targets.choose(&mut rng).ok_or("no targets seeded")?.id),
            clothes_type_id: ClothesTypeId::new(clothes_type.id),
            brand_id: BrandId::new(brands.choose(&mut rng).ok_or("no brands seeded")?.id),
            stripe_product_id,
            name,
            description: format!("Demo {} for the seeded catalog", clothes_type.name),
            category: (*CATEGORY_NAMES.choose(&mut rng).ok_or("no categories")?).to_owned(),
            price,
            release_date,
            stock_quantity: rng.random_range(0..=100),
        };
        products.create(&new).await?;
    }
    tracing::info!(count = product_count, "Products seeded");

    let users = UserRepository::new(&pool);
    let password_hash = hash_password(DEMO_PASSWORD)?;
    for index in 0..user_count {
        let name = format!("demo-user-{index}");
        let email = Email::parse(&format!("demo{index}@wardrobe.example"))?;
        let role = if index < 2 { Role::Admin } else { Role::Registered };

        let stripe_customer_id = stripe
            .create_customer(&name, email.as_str(), "")
            .await?;

        let new = NewUser {
            stripe_customer_id,
            name,
            email,
            password_hash: Some(password_hash.clone()),
            role,
            address: String::new(),
            is_active: true,
            is_staff: role == Role::Admin,
        };
        users.create(&new).await?;
    }
    tracing::info!(count = user_count, "Users seeded");

    Ok(())
}
