//! DbPatchable implementations.
//!
//! This sits in the `db` module because it contains SQL/table knowledge.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::db::patch::{AccountPatch, DbPatchable, RecordPatch};
use crate::error::StrokedeskError;

#[async_trait]
impl DbPatchable for AccountPatch {
    async fn apply_patch(&self, pool: &SqlitePool) -> Result<bool, StrokedeskError> {
        let AccountPatch {
            id,
            last_login,
            is_active,
        } = self.clone();

        let last_login_set = last_login.is_some();
        let is_active_set = is_active.is_some();

        let res = sqlx::query(
            r#"
            UPDATE users
            SET
                last_login = COALESCE(?, last_login),
                is_active = COALESCE(?, is_active)
            WHERE id = ?
            "#,
        )
        .bind(last_login)
        .bind(is_active)
        .bind(id)
        .execute(pool)
        .await?;

        let affected = res.rows_affected();
        debug!(
            table = "users",
            id,
            affected,
            last_login_set,
            is_active_set,
            "db patch applied"
        );

        Ok(affected > 0)
    }
}

#[async_trait]
impl DbPatchable for RecordPatch {
    /// Merge and write in a single statement.
    ///
    /// The WHERE clause only matches when the merge changes a clinical column,
    /// so `updated_at` moves on a real modification only. Concurrent writers
    /// queue on the busy timeout; there is no read snapshot to go stale.
    async fn apply_patch(&self, pool: &SqlitePool) -> Result<bool, StrokedeskError> {
        let p = &self.patch;
        let updated_at = Utc::now();

        // `bmi` distinguishes "leave as is" from "clear", so it travels as a
        // (set, value) pair instead of going through COALESCE.
        let bmi_set = p.bmi.is_some();
        let bmi_value = p.bmi.flatten();

        let res = sqlx::query(
            r#"
            UPDATE patients
            SET
                gender = COALESCE(?1, gender),
                age = COALESCE(?2, age),
                hypertension = COALESCE(?3, hypertension),
                heart_disease = COALESCE(?4, heart_disease),
                ever_married = COALESCE(?5, ever_married),
                work_type = COALESCE(?6, work_type),
                residence_type = COALESCE(?7, residence_type),
                avg_glucose_level = COALESCE(?8, avg_glucose_level),
                bmi = CASE WHEN ?9 THEN ?10 ELSE bmi END,
                smoking_status = COALESCE(?11, smoking_status),
                stroke = COALESCE(?12, stroke),
                updated_at = ?13,
                updated_by = COALESCE(?14, updated_by)
            WHERE id = ?15
              AND (
                    gender IS NOT COALESCE(?1, gender)
                 OR age IS NOT COALESCE(?2, age)
                 OR hypertension IS NOT COALESCE(?3, hypertension)
                 OR heart_disease IS NOT COALESCE(?4, heart_disease)
                 OR ever_married IS NOT COALESCE(?5, ever_married)
                 OR work_type IS NOT COALESCE(?6, work_type)
                 OR residence_type IS NOT COALESCE(?7, residence_type)
                 OR avg_glucose_level IS NOT COALESCE(?8, avg_glucose_level)
                 OR bmi IS NOT (CASE WHEN ?9 THEN ?10 ELSE bmi END)
                 OR smoking_status IS NOT COALESCE(?11, smoking_status)
                 OR stroke IS NOT COALESCE(?12, stroke)
              )
            "#,
        )
        .bind(p.gender.map(|v| v.as_str()))
        .bind(p.age)
        .bind(p.hypertension)
        .bind(p.heart_disease)
        .bind(p.ever_married.map(|v| v.as_str()))
        .bind(p.work_type.map(|v| v.as_str()))
        .bind(p.residence_type.map(|v| v.as_str()))
        .bind(p.avg_glucose_level)
        .bind(bmi_set)
        .bind(bmi_value)
        .bind(p.smoking_status.map(|v| v.as_str()))
        .bind(p.stroke)
        .bind(updated_at)
        .bind(p.updated_by)
        .bind(&self.id)
        .execute(pool)
        .await?;

        let affected = res.rows_affected();
        debug!(
            table = "patients",
            id = %self.id,
            affected,
            bmi_set,
            updated_at = %updated_at,
            "db patch applied"
        );

        Ok(affected > 0)
    }
}
