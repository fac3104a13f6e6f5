use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;
use uuid::Uuid;

use rxstock_auth::{NewUser, Role, User, UserUpdate};
use rxstock_core::{DomainError, MedicineId, SaleId, SaleLineId, UserId};
use rxstock_inventory::{Category, MedicineDraft, MedicineItem};
use rxstock_sales::{Sale, SaleDraft, SaleLine};

use crate::error::{StoreError, StoreResult};
use crate::store::{CatalogEntry, PharmacyStore, SaleSummary};

/// Postgres-backed store.
///
/// Queries are plain runtime queries; the schema lives in
/// `migrations/0001_init.sql`. Multi-step mutations run inside one
/// transaction, so a failed step rolls back everything before it.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str) -> StoreResult<Self> {
        let pool = PgPool::connect(url).await?;
        Ok(Self::new(pool))
    }
}

fn medicine_from_row(row: &PgRow) -> Result<MedicineItem, sqlx::Error> {
    Ok(MedicineItem {
        id: MedicineId::from_uuid(row.try_get::<Uuid, _>("id")?),
        name: row.try_get("name")?,
        generic_name: row.try_get("generic_name")?,
        brand: row.try_get("brand")?,
        category_id: row
            .try_get::<Option<Uuid>, _>("category_id")?
            .map(Into::into),
        dosage: row.try_get("dosage")?,
        unit_price: row.try_get("unit_price")?,
        stock_quantity: row.try_get("stock_quantity")?,
        reorder_level: row.try_get("reorder_level")?,
        batch_number: row.try_get("batch_number")?,
        expiry_date: row.try_get("expiry_date")?,
        supplier: row.try_get("supplier")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn category_from_row(row: &PgRow) -> Result<Category, sqlx::Error> {
    Ok(Category {
        id: row.try_get::<Uuid, _>("id")?.into(),
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        color: row.try_get("color")?,
    })
}

fn user_from_row(row: &PgRow) -> StoreResult<User> {
    let role: String = row.try_get("role").map_err(StoreError::from)?;
    Ok(User {
        id: UserId::from_uuid(row.try_get::<Uuid, _>("id").map_err(StoreError::from)?),
        full_name: row.try_get("full_name").map_err(StoreError::from)?,
        username: row.try_get("username").map_err(StoreError::from)?,
        email: row.try_get("email").map_err(StoreError::from)?,
        password_hash: row.try_get("password_hash").map_err(StoreError::from)?,
        role: Role::parse(&role)
            .map_err(|_| StoreError::Database(format!("unknown role in users row: {role}")))?,
        last_login: row.try_get("last_login").map_err(StoreError::from)?,
        created_at: row.try_get("created_at").map_err(StoreError::from)?,
    })
}

fn sale_from_row(row: &PgRow) -> Result<Sale, sqlx::Error> {
    Ok(Sale {
        id: SaleId::from_uuid(row.try_get::<Uuid, _>("id")?),
        customer_name: row.try_get("customer_name")?,
        total_amount: row.try_get("total_amount")?,
        sale_date: row.try_get("sale_date")?,
        user_id: UserId::from_uuid(row.try_get::<Uuid, _>("user_id")?),
        created_at: row.try_get("created_at")?,
    })
}

fn sale_line_from_row(row: &PgRow) -> Result<SaleLine, sqlx::Error> {
    Ok(SaleLine {
        id: SaleLineId::from_uuid(row.try_get::<Uuid, _>("id")?),
        sale_id: SaleId::from_uuid(row.try_get::<Uuid, _>("sale_id")?),
        medicine_id: MedicineId::from_uuid(row.try_get::<Uuid, _>("medicine_id")?),
        quantity: row.try_get("quantity")?,
        unit_price: row.try_get("unit_price")?,
        total_price: row.try_get("total_price")?,
    })
}

const MEDICINE_COLUMNS: &str = "id, name, generic_name, brand, category_id, dosage, unit_price, \
     stock_quantity, reorder_level, batch_number, expiry_date, supplier, created_at, updated_at";

const USER_COLUMNS: &str =
    "id, full_name, username, email, password_hash, role, last_login, created_at";

impl PostgresStore {
    /// Resolve a category name inside an open transaction, creating the row
    /// on first use.
    async fn upsert_category_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        name: &str,
    ) -> StoreResult<Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("category name is required").into());
        }
        if let Some(row) =
            sqlx::query("SELECT id, name, description, color FROM categories WHERE name = $1")
                .bind(name)
                .fetch_optional(&mut **tx)
                .await?
        {
            return Ok(category_from_row(&row)?);
        }
        let category = Category::auto(name);
        sqlx::query("INSERT INTO categories (id, name, description, color) VALUES ($1, $2, $3, $4)")
            .bind(category.id.as_uuid())
            .bind(&category.name)
            .bind(&category.description)
            .bind(&category.color)
            .execute(&mut **tx)
            .await?;
        tracing::info!(category = %category.name, "auto-created category");
        Ok(category)
    }
}

#[async_trait]
impl PharmacyStore for PostgresStore {
    async fn list_catalog(&self) -> StoreResult<Vec<CatalogEntry>> {
        let rows = sqlx::query(
            "SELECT m.id, m.name, m.generic_name, m.brand, m.category_id, m.dosage, \
                    m.unit_price, m.stock_quantity, m.reorder_level, m.batch_number, \
                    m.expiry_date, m.supplier, m.created_at, m.updated_at, \
                    c.id AS cat_id, c.name AS cat_name, \
                    c.description AS cat_description, c.color AS cat_color \
             FROM medicines m \
             LEFT JOIN categories c ON c.id = m.category_id \
             ORDER BY m.name",
        )
        .fetch_all(&self.pool)
        .await?;
        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            let medicine = medicine_from_row(&row)?;
            let category = match row.try_get::<Option<Uuid>, _>("cat_id")? {
                Some(id) => Some(Category {
                    id: id.into(),
                    name: row.try_get("cat_name")?,
                    description: row.try_get("cat_description")?,
                    color: row.try_get("cat_color")?,
                }),
                None => None,
            };
            entries.push(CatalogEntry { medicine, category });
        }
        Ok(entries)
    }

    async fn get_medicine(&self, id: MedicineId) -> StoreResult<MedicineItem> {
        let sql = format!("SELECT {MEDICINE_COLUMNS} FROM medicines WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DomainError::NotFound)?;
        Ok(medicine_from_row(&row)?)
    }

    async fn create_medicine(&self, draft: MedicineDraft) -> StoreResult<CatalogEntry> {
        draft.validate()?;
        let mut tx = self.pool.begin().await?;
        let category = match draft.category.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => Some(Self::upsert_category_tx(&mut tx, name).await?),
            _ => None,
        };
        let medicine = MedicineItem::create(
            MedicineId::new(),
            draft,
            category.as_ref().map(|c| c.id),
            Utc::now(),
        )?;
        sqlx::query(
            "INSERT INTO medicines (id, name, generic_name, brand, category_id, dosage, \
                 unit_price, stock_quantity, reorder_level, batch_number, expiry_date, supplier, \
                 created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
        )
        .bind(medicine.id.as_uuid())
        .bind(&medicine.name)
        .bind(&medicine.generic_name)
        .bind(&medicine.brand)
        .bind(medicine.category_id.map(|id| *id.as_uuid()))
        .bind(&medicine.dosage)
        .bind(medicine.unit_price)
        .bind(medicine.stock_quantity)
        .bind(medicine.reorder_level)
        .bind(&medicine.batch_number)
        .bind(medicine.expiry_date)
        .bind(&medicine.supplier)
        .bind(medicine.created_at)
        .bind(medicine.updated_at)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(CatalogEntry { medicine, category })
    }

    async fn update_medicine(
        &self,
        id: MedicineId,
        draft: MedicineDraft,
    ) -> StoreResult<CatalogEntry> {
        draft.validate()?;
        let mut tx = self.pool.begin().await?;
        let sql = format!("SELECT {MEDICINE_COLUMNS} FROM medicines WHERE id = $1 FOR UPDATE");
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(DomainError::NotFound)?;
        let mut medicine = medicine_from_row(&row)?;

        let category = match draft.category.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => Some(Self::upsert_category_tx(&mut tx, name).await?),
            _ => None,
        };
        medicine.apply_update(draft, category.as_ref().map(|c| c.id), Utc::now())?;

        sqlx::query(
            "UPDATE medicines SET name = $2, generic_name = $3, brand = $4, category_id = $5, \
                 dosage = $6, unit_price = $7, stock_quantity = $8, reorder_level = $9, \
                 batch_number = $10, expiry_date = $11, supplier = $12, updated_at = $13 \
             WHERE id = $1",
        )
        .bind(medicine.id.as_uuid())
        .bind(&medicine.name)
        .bind(&medicine.generic_name)
        .bind(&medicine.brand)
        .bind(medicine.category_id.map(|id| *id.as_uuid()))
        .bind(&medicine.dosage)
        .bind(medicine.unit_price)
        .bind(medicine.stock_quantity)
        .bind(medicine.reorder_level)
        .bind(&medicine.batch_number)
        .bind(medicine.expiry_date)
        .bind(&medicine.supplier)
        .bind(medicine.updated_at)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(CatalogEntry { medicine, category })
    }

    async fn delete_medicine(&self, id: MedicineId) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM sale_items WHERE medicine_id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM medicines WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(DomainError::not_found().into());
        }
        tx.commit().await?;
        tracing::info!(medicine_id = %id, "deleted medicine and referencing sale lines");
        Ok(())
    }

    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        let rows =
            sqlx::query("SELECT id, name, description, color FROM categories ORDER BY name")
                .fetch_all(&self.pool)
                .await?;
        rows.iter()
            .map(|row| category_from_row(row).map_err(StoreError::from))
            .collect()
    }

    async fn upsert_category_by_name(&self, name: &str) -> StoreResult<Category> {
        let mut tx = self.pool.begin().await?;
        let category = Self::upsert_category_tx(&mut tx, name).await?;
        tx.commit().await?;
        Ok(category)
    }

    async fn create_sale(&self, actor: UserId, draft: SaleDraft) -> StoreResult<SaleId> {
        let sale = Sale::from_draft(SaleId::new(), &draft, actor, Utc::now())?;
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO sales (id, customer_name, total_amount, sale_date, user_id, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(sale.id.as_uuid())
        .bind(&sale.customer_name)
        .bind(sale.total_amount)
        .bind(sale.sale_date)
        .bind(sale.user_id.as_uuid())
        .bind(sale.created_at)
        .execute(&mut *tx)
        .await?;

        for line in &draft.items {
            let built = SaleLine::from_draft(SaleLineId::new(), sale.id, line);
            sqlx::query(
                "INSERT INTO sale_items (id, sale_id, medicine_id, quantity, unit_price, \
                     total_price) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(built.id.as_uuid())
            .bind(built.sale_id.as_uuid())
            .bind(built.medicine_id.as_uuid())
            .bind(built.quantity)
            .bind(built.unit_price)
            .bind(built.total_price)
            .execute(&mut *tx)
            .await?;

            // Decrement in place and read the result back; a negative result
            // or missing medicine aborts the whole transaction.
            let remaining: Option<i64> = sqlx::query_scalar(
                "UPDATE medicines SET stock_quantity = stock_quantity - $1 \
                 WHERE id = $2 RETURNING stock_quantity",
            )
            .bind(line.quantity)
            .bind(line.medicine_id.as_uuid())
            .fetch_optional(&mut *tx)
            .await?;
            match remaining {
                None => {
                    tx.rollback().await?;
                    return Err(DomainError::not_found().into());
                }
                Some(stock) if stock < 0 => {
                    tx.rollback().await?;
                    return Err(DomainError::insufficient_stock(line.medicine_id).into());
                }
                Some(_) => {}
            }
        }

        tx.commit().await?;
        tracing::info!(sale_id = %sale.id, "recorded sale");
        Ok(sale.id)
    }

    async fn delete_sale(&self, id: SaleId) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        let lines = sqlx::query("SELECT medicine_id, quantity FROM sale_items WHERE sale_id = $1")
            .bind(id.as_uuid())
            .fetch_all(&mut *tx)
            .await?;
        for line in &lines {
            let medicine_id: Uuid = line.try_get("medicine_id")?;
            let quantity: i64 = line.try_get("quantity")?;
            sqlx::query("UPDATE medicines SET stock_quantity = stock_quantity + $1 WHERE id = $2")
                .bind(quantity)
                .bind(medicine_id)
                .execute(&mut *tx)
                .await?;
        }
        // Line items go with the header via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM sales WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(DomainError::not_found().into());
        }
        tx.commit().await?;
        tracing::info!(sale_id = %id, "deleted sale and restored stock");
        Ok(())
    }

    async fn list_recent_sales(&self, limit: i64) -> StoreResult<Vec<SaleSummary>> {
        let rows = sqlx::query(
            "SELECT s.id, s.customer_name, s.total_amount, s.sale_date, s.user_id, s.created_at, \
                    u.full_name AS cashier_name, \
                    (SELECT COUNT(*) FROM sale_items i WHERE i.sale_id = s.id) AS items_count \
             FROM sales s \
             LEFT JOIN users u ON u.id = s.user_id \
             ORDER BY s.created_at DESC, s.id DESC \
             LIMIT $1",
        )
        .bind(limit.max(0))
        .fetch_all(&self.pool)
        .await?;
        let mut summaries = Vec::with_capacity(rows.len());
        for row in rows {
            summaries.push(SaleSummary {
                sale: sale_from_row(&row)?,
                cashier_name: row.try_get("cashier_name")?,
                items_count: row.try_get::<i64, _>("items_count")?.max(0) as u64,
            });
        }
        Ok(summaries)
    }

    async fn list_sale_lines(&self, sale_id: SaleId) -> StoreResult<Vec<SaleLine>> {
        let rows = sqlx::query(
            "SELECT id, sale_id, medicine_id, quantity, unit_price, total_price \
             FROM sale_items WHERE sale_id = $1",
        )
        .bind(sale_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;
        rows.iter()
            .map(|row| sale_line_from_row(row).map_err(StoreError::from))
            .collect()
    }

    async fn sale_totals_by_date(&self) -> StoreResult<Vec<(NaiveDate, Decimal)>> {
        let rows = sqlx::query("SELECT sale_date, total_amount FROM sales")
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|row| {
                Ok((
                    row.try_get::<NaiveDate, _>("sale_date")?,
                    row.try_get::<Decimal, _>("total_amount")?,
                ))
            })
            .collect::<Result<_, sqlx::Error>>()
            .map_err(StoreError::from)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(user_from_row).collect()
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        let row = sqlx::query(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn create_user(&self, new: NewUser, password_hash: String) -> StoreResult<User> {
        let user = User::create(UserId::new(), &new, password_hash, Utc::now())?;
        let mut tx = self.pool.begin().await?;
        let taken: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM users WHERE username = $1 OR email = $2")
                .bind(&user.username)
                .bind(&user.email)
                .fetch_optional(&mut *tx)
                .await?;
        if taken.is_some() {
            tx.rollback().await?;
            return Err(DomainError::DuplicateCredential.into());
        }
        sqlx::query(
            "INSERT INTO users (id, full_name, username, email, password_hash, role, \
                 last_login, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(user.id.as_uuid())
        .bind(&user.full_name)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.last_login)
        .bind(user.created_at)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(user)
    }

    async fn update_user(
        &self,
        id: UserId,
        update: UserUpdate,
        password_hash: Option<String>,
    ) -> StoreResult<User> {
        update.validate()?;
        let mut tx = self.pool.begin().await?;
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1 FOR UPDATE");
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(DomainError::NotFound)?;
        let mut user = user_from_row(&row)?;

        let taken: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM users WHERE (username = $1 OR email = $2) AND id <> $3",
        )
        .bind(update.username.trim())
        .bind(update.email.trim())
        .bind(id.as_uuid())
        .fetch_optional(&mut *tx)
        .await?;
        if taken.is_some() {
            tx.rollback().await?;
            return Err(DomainError::DuplicateCredential.into());
        }

        user.apply_update(&update, password_hash)?;
        sqlx::query(
            "UPDATE users SET full_name = $2, username = $3, email = $4, password_hash = $5, \
                 role = $6 \
             WHERE id = $1",
        )
        .bind(user.id.as_uuid())
        .bind(&user.full_name)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(user)
    }

    async fn delete_user(&self, id: UserId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DomainError::not_found().into());
        }
        Ok(())
    }

    async fn record_login(&self, id: UserId, at: DateTime<Utc>) -> StoreResult<()> {
        let result = sqlx::query("UPDATE users SET last_login = $1 WHERE id = $2")
            .bind(at)
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DomainError::not_found().into());
        }
        Ok(())
    }
}
