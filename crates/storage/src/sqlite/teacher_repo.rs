use lms_core::model::{Teacher, TeacherId};

use super::SqliteRepository;
use super::mapping::{TEACHER_COLUMNS, db, map_teacher_row};
use crate::repository::{StorageError, TeacherRepository};

#[async_trait::async_trait]
impl TeacherRepository for SqliteRepository {
    async fn upsert_teacher(&self, teacher: &Teacher) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO teachers (id, name, major, contract_end_month, contract_termination_date,
                class_start_date, phone, police_check_date, contract_date, date_of_birth,
                address, email, bank_account)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                major = excluded.major,
                contract_end_month = excluded.contract_end_month,
                contract_termination_date = excluded.contract_termination_date,
                class_start_date = excluded.class_start_date,
                phone = excluded.phone,
                police_check_date = excluded.police_check_date,
                contract_date = excluded.contract_date,
                date_of_birth = excluded.date_of_birth,
                address = excluded.address,
                email = excluded.email,
                bank_account = excluded.bank_account
            ",
        )
        .bind(teacher.id.as_str())
        .bind(&teacher.name)
        .bind(&teacher.major)
        .bind(&teacher.contract_end_month)
        .bind(teacher.contract_termination_date)
        .bind(teacher.class_start_date)
        .bind(&teacher.phone)
        .bind(teacher.police_check_date)
        .bind(teacher.contract_date)
        .bind(teacher.date_of_birth)
        .bind(&teacher.address)
        .bind(&teacher.email)
        .bind(&teacher.bank_account)
        .execute(&self.pool)
        .await
        .map_err(db)?;

        Ok(())
    }

    async fn get_teacher(&self, id: &TeacherId) -> Result<Option<Teacher>, StorageError> {
        let sql = format!("SELECT {TEACHER_COLUMNS} FROM teachers WHERE id = ?1");
        let row = sqlx::query(&sql)
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(db)?;

        row.as_ref().map(map_teacher_row).transpose()
    }

    async fn list_teachers(&self) -> Result<Vec<Teacher>, StorageError> {
        let sql = format!("SELECT {TEACHER_COLUMNS} FROM teachers ORDER BY seq ASC");
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(db)?;

        rows.iter().map(map_teacher_row).collect()
    }

    async fn delete_teacher(&self, id: &TeacherId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM teachers WHERE id = ?1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(db)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
