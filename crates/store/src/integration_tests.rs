use chrono::{NaiveDate, Utc};
use rust_decimal_macros::dec;

use rxstock_auth::{NewUser, Role, UserUpdate};
use rxstock_core::{DomainError, MedicineId, UserId};
use rxstock_inventory::MedicineDraft;
use rxstock_sales::{SaleDraft, SaleLineDraft};

use crate::{InMemoryStore, PharmacyStore, StoreError};

fn draft(name: &str, stock: i64) -> MedicineDraft {
    MedicineDraft {
        name: name.to_string(),
        generic_name: None,
        brand: None,
        category: None,
        dosage: None,
        unit_price: dec!(2.50),
        stock_quantity: stock,
        reorder_level: None,
        batch_number: None,
        expiry_date: None,
        supplier: None,
    }
}

fn sale_of(medicine_id: MedicineId, quantity: i64) -> SaleDraft {
    SaleDraft {
        customer_name: None,
        sale_date: NaiveDate::from_ymd_opt(2024, 3, 15),
        items: vec![SaleLineDraft {
            medicine_id,
            quantity,
            unit_price: dec!(2.50),
        }],
    }
}

fn new_user(username: &str, email: &str) -> NewUser {
    NewUser {
        full_name: format!("{username} person"),
        username: username.to_string(),
        email: email.to_string(),
        password: "secret".to_string(),
        role: Role::Pharmacist,
    }
}

#[tokio::test]
async fn sale_decrements_stock() {
    let store = InMemoryStore::new();
    let entry = store.create_medicine(draft("Paracetamol", 20)).await.unwrap();

    store
        .create_sale(UserId::new(), sale_of(entry.medicine.id, 3))
        .await
        .unwrap();

    let after = store.get_medicine(entry.medicine.id).await.unwrap();
    assert_eq!(after.stock_quantity, 17);
}

#[tokio::test]
async fn oversold_sale_leaves_no_trace() {
    let store = InMemoryStore::new();
    let entry = store.create_medicine(draft("Insulin", 1)).await.unwrap();

    let err = store
        .create_sale(UserId::new(), sale_of(entry.medicine.id, 3))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Domain(DomainError::InsufficientStock { medicine_id })
            if medicine_id == entry.medicine.id
    ));

    let after = store.get_medicine(entry.medicine.id).await.unwrap();
    assert_eq!(after.stock_quantity, 1);
    assert!(store.list_recent_sales(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_line_quantities_accumulate() {
    let store = InMemoryStore::new();
    let entry = store.create_medicine(draft("Aspirin", 5)).await.unwrap();

    // 3 + 3 exceeds a stock of 5 even though each line alone fits.
    let mut sale = sale_of(entry.medicine.id, 3);
    sale.items.push(SaleLineDraft {
        medicine_id: entry.medicine.id,
        quantity: 3,
        unit_price: dec!(2.50),
    });

    let err = store.create_sale(UserId::new(), sale).await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::Domain(DomainError::InsufficientStock { .. })
    ));
    let after = store.get_medicine(entry.medicine.id).await.unwrap();
    assert_eq!(after.stock_quantity, 5);
}

#[tokio::test]
async fn sale_of_unknown_medicine_is_not_found() {
    let store = InMemoryStore::new();
    let err = store
        .create_sale(UserId::new(), sale_of(MedicineId::new(), 1))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn deleting_a_sale_restores_stock() {
    let store = InMemoryStore::new();
    let entry = store.create_medicine(draft("Ibuprofen", 10)).await.unwrap();
    let sale_id = store
        .create_sale(UserId::new(), sale_of(entry.medicine.id, 4))
        .await
        .unwrap();

    store.delete_sale(sale_id).await.unwrap();

    let after = store.get_medicine(entry.medicine.id).await.unwrap();
    assert_eq!(after.stock_quantity, 10);
    assert!(store.list_sale_lines(sale_id).await.unwrap().is_empty());

    // Gone means gone: a second delete is NotFound and restores nothing.
    let err = store.delete_sale(sale_id).await.unwrap_err();
    assert!(err.is_not_found());
    let after = store.get_medicine(entry.medicine.id).await.unwrap();
    assert_eq!(after.stock_quantity, 10);
}

#[tokio::test]
async fn deleting_a_medicine_removes_its_sale_lines() {
    let store = InMemoryStore::new();
    let kept = store.create_medicine(draft("Cetirizine", 30)).await.unwrap();
    let doomed = store.create_medicine(draft("Loratadine", 30)).await.unwrap();

    let mut sale = sale_of(kept.medicine.id, 2);
    sale.items.push(SaleLineDraft {
        medicine_id: doomed.medicine.id,
        quantity: 1,
        unit_price: dec!(2.50),
    });
    let sale_id = store.create_sale(UserId::new(), sale).await.unwrap();

    store.delete_medicine(doomed.medicine.id).await.unwrap();

    let lines = store.list_sale_lines(sale_id).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].medicine_id, kept.medicine.id);
    assert!(store.get_medicine(doomed.medicine.id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn deleting_an_absent_medicine_changes_nothing() {
    let store = InMemoryStore::new();
    let entry = store.create_medicine(draft("Omeprazole", 8)).await.unwrap();
    let sale_id = store
        .create_sale(UserId::new(), sale_of(entry.medicine.id, 1))
        .await
        .unwrap();

    let err = store.delete_medicine(MedicineId::new()).await.unwrap_err();
    assert!(err.is_not_found());

    assert_eq!(store.list_sale_lines(sale_id).await.unwrap().len(), 1);
    assert_eq!(store.list_catalog().await.unwrap().len(), 1);
}

#[tokio::test]
async fn category_is_created_on_first_use_and_reused_after() {
    let store = InMemoryStore::new();
    let mut d = draft("Amoxicillin", 12);
    d.category = Some("Antibiotics".to_string());
    let first = store.create_medicine(d.clone()).await.unwrap();

    d.name = "Azithromycin".to_string();
    let second = store.create_medicine(d).await.unwrap();

    let first_cat = first.category.unwrap();
    let second_cat = second.category.unwrap();
    assert_eq!(first_cat.id, second_cat.id);
    assert_eq!(first_cat.description, "Auto-created category");
    assert_eq!(store.list_categories().await.unwrap().len(), 1);
}

#[tokio::test]
async fn update_refreshes_updated_at_but_sales_do_not() {
    let store = InMemoryStore::new();
    let entry = store.create_medicine(draft("Metformin", 50)).await.unwrap();
    let before = entry.medicine.updated_at;

    store
        .create_sale(UserId::new(), sale_of(entry.medicine.id, 5))
        .await
        .unwrap();
    let after_sale = store.get_medicine(entry.medicine.id).await.unwrap();
    assert_eq!(after_sale.updated_at, before);

    let updated = store
        .update_medicine(entry.medicine.id, draft("Metformin 500mg", 45))
        .await
        .unwrap();
    assert!(updated.medicine.updated_at >= before);
    assert_eq!(updated.medicine.name, "Metformin 500mg");
}

#[tokio::test]
async fn duplicate_credentials_are_rejected() {
    let store = InMemoryStore::new();
    store
        .create_user(new_user("jane", "jane@example.com"), "hash".to_string())
        .await
        .unwrap();

    let err = store
        .create_user(new_user("jane", "other@example.com"), "hash".to_string())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Domain(DomainError::DuplicateCredential)
    ));

    let err = store
        .create_user(new_user("janet", "jane@example.com"), "hash".to_string())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Domain(DomainError::DuplicateCredential)
    ));
}

#[tokio::test]
async fn user_update_excludes_self_from_uniqueness() {
    let store = InMemoryStore::new();
    let jane = store
        .create_user(new_user("jane", "jane@example.com"), "hash".to_string())
        .await
        .unwrap();
    store
        .create_user(new_user("john", "john@example.com"), "hash".to_string())
        .await
        .unwrap();

    // Keeping her own username is fine.
    let updated = store
        .update_user(
            jane.id,
            UserUpdate {
                full_name: "Jane A. Doe".to_string(),
                username: "jane".to_string(),
                email: "jane@example.com".to_string(),
                role: Role::Admin,
                new_password: None,
            },
            None,
        )
        .await
        .unwrap();
    assert_eq!(updated.role, Role::Admin);
    assert_eq!(updated.password_hash, "hash");

    // Taking John's username is not.
    let err = store
        .update_user(
            jane.id,
            UserUpdate {
                full_name: "Jane A. Doe".to_string(),
                username: "john".to_string(),
                email: "jane@example.com".to_string(),
                role: Role::Admin,
                new_password: None,
            },
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Domain(DomainError::DuplicateCredential)
    ));
}

#[tokio::test]
async fn record_login_sets_last_login() {
    let store = InMemoryStore::new();
    let user = store
        .create_user(new_user("jane", "jane@example.com"), "hash".to_string())
        .await
        .unwrap();
    assert!(user.last_login.is_none());

    let at = Utc::now();
    store.record_login(user.id, at).await.unwrap();
    let found = store.find_user_by_username("jane").await.unwrap().unwrap();
    assert_eq!(found.last_login, Some(at));

    assert!(store.record_login(UserId::new(), at).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn recent_sales_carry_cashier_and_item_counts() {
    let store = InMemoryStore::new();
    let cashier = store
        .create_user(new_user("jane", "jane@example.com"), "hash".to_string())
        .await
        .unwrap();
    let entry = store.create_medicine(draft("Vitamin C", 100)).await.unwrap();

    let first = store
        .create_sale(cashier.id, sale_of(entry.medicine.id, 1))
        .await
        .unwrap();
    let second = store
        .create_sale(UserId::new(), sale_of(entry.medicine.id, 2))
        .await
        .unwrap();

    let recent = store.list_recent_sales(10).await.unwrap();
    assert_eq!(recent.len(), 2);
    // Newest first.
    assert_eq!(recent[0].sale.id, second);
    assert_eq!(recent[1].sale.id, first);
    assert_eq!(recent[1].cashier_name.as_deref(), Some("jane person"));
    // The second sale's user does not exist, so the name is absent.
    assert_eq!(recent[0].cashier_name, None);
    assert_eq!(recent[0].items_count, 1);

    assert_eq!(store.list_recent_sales(1).await.unwrap().len(), 1);
}
