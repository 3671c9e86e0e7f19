use sea_orm::*;

use crate::models::{application, property, tenant, unit, work_order};
use crate::services::lease_service;

/// Seed a small demo portfolio. Skipped entirely when any property
/// already exists, so running it twice is harmless.
pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<(), DbErr> {
    let existing = property::Entity::find().count(db).await?;
    if existing > 0 {
        tracing::info!("Demo data already present, skipping seed");
        return Ok(());
    }

    let now = chrono::Utc::now().to_rfc3339();

    // 1. Property with a few units
    let prop = property::ActiveModel {
        site_id: Set("default".to_owned()),
        name: Set("Maple Court".to_owned()),
        address: Set("12 Maple Street".to_owned()),
        city: Set("Springfield".to_owned()),
        state: Set(Some("IL".to_owned())),
        postal_code: Set(Some("62704".to_owned())),
        notes: Set(None),
        created_at: Set(now.clone()),
        updated_at: Set(now.clone()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let mut unit_ids = Vec::new();
    for (number, bedrooms, rent) in [("101", 1, 1150.0), ("102", 2, 1475.0), ("201", 2, 1525.0)] {
        let u = unit::ActiveModel {
            property_id: Set(prop.id),
            unit_number: Set(number.to_owned()),
            bedrooms: Set(bedrooms),
            bathrooms: Set(1.0),
            square_feet: Set(Some(bedrooms * 450)),
            rent_amount: Set(rent),
            status: Set("vacant".to_owned()),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        }
        .insert(db)
        .await?;
        unit_ids.push(u.id);
    }

    // 2. Tenants
    let alice = tenant::ActiveModel {
        site_id: Set("default".to_owned()),
        name: Set("Alice Ramirez".to_owned()),
        first_name: Set(Some("Alice".to_owned())),
        email: Set(Some("alice@example.com".to_owned())),
        phone: Set(Some("555-0101".to_owned())),
        emergency_contact: Set(None),
        notes: Set(None),
        is_active: Set(true),
        created_at: Set(now.clone()),
        updated_at: Set(now.clone()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    // 3. A lease mid-onboarding, checklist seeded from the default template
    let lease = crate::models::lease::ActiveModel {
        site_id: Set("default".to_owned()),
        unit_id: Set(unit_ids[0]),
        tenant_id: Set(alice.id),
        start_date: Set("2026-09-01".to_owned()),
        end_date: Set("2027-08-31".to_owned()),
        rent_amount: Set(1150.0),
        deposit_amount: Set(1150.0),
        status: Set("draft".to_owned()),
        onboarding_pending: Set(false),
        notes: Set(None),
        created_at: Set(now.clone()),
        updated_at: Set(now.clone()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    if let Err(e) = lease_service::create_checklist(db, lease.id, None).await {
        tracing::error!("Failed to seed lease checklist: {}", e);
    }

    // 4. Applications across the pipeline
    for (name, email, status) in [
        ("Ben Okafor", "ben@example.com", "new"),
        ("Carla Nguyen", "carla@example.com", "documents_pending"),
        ("Dmitri Ivanov", "dmitri@example.com", "under_review"),
        ("Erin Walsh", "erin@example.com", "approved"),
    ] {
        application::ActiveModel {
            site_id: Set("default".to_owned()),
            unit_id: Set(Some(unit_ids[1])),
            applicant_name: Set(name.to_owned()),
            email: Set(Some(email.to_owned())),
            phone: Set(None),
            status: Set(status.to_owned()),
            notes: Set(None),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    // 5. One open work order
    work_order::ActiveModel {
        site_id: Set("default".to_owned()),
        unit_id: Set(unit_ids[2]),
        title: Set("Leaking kitchen faucet".to_owned()),
        description: Set(Some("Drip under the sink, tenant reported at move-out".to_owned())),
        priority: Set("normal".to_owned()),
        status: Set("open".to_owned()),
        reported_by: Set(Some("internal".to_owned())),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!("Demo data seeded");
    Ok(())
}
