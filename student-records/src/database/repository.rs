//! Repository layer for database operations
//!
//! This module provides CRUD operations for all entities.
//! Default listings only return active records; archived rows stay
//! reachable by id.

use super::models::*;
use crate::error::{AppError, Result};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

const STUDENT_DETAIL_SELECT: &str = r#"
    SELECT s.*, d.name AS department_name
    FROM students s
    LEFT JOIN departments d ON d.id = s.department_id
"#;

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ===== Lookups =====

    /// List every row of a lookup table, ordered by name
    pub async fn list_lookups(&self, kind: LookupKind) -> Result<Vec<Lookup>> {
        let sql = format!("SELECT * FROM {} ORDER BY name ASC, created_at ASC", kind.table());
        let rows = sqlx::query_as::<_, Lookup>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    /// Get a lookup row by ID
    pub async fn get_lookup(&self, kind: LookupKind, id: &str) -> Result<Lookup> {
        let sql = format!("SELECT * FROM {} WHERE id = ?", kind.table());
        sqlx::query_as::<_, Lookup>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found(kind.entity_name(), id))
    }

    /// Find the first lookup row carrying exactly this name
    pub async fn find_lookup_by_name(&self, kind: LookupKind, name: &str) -> Result<Option<Lookup>> {
        let sql = format!(
            "SELECT * FROM {} WHERE name = ? ORDER BY created_at ASC LIMIT 1",
            kind.table()
        );
        let row = sqlx::query_as::<_, Lookup>(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    /// Create a lookup row. Names are not required to be unique.
    pub async fn create_lookup(&self, kind: LookupKind, name: &str) -> Result<Lookup> {
        let id = Uuid::new_v4().to_string();
        let sql = format!(
            "INSERT INTO {} (id, name, created_at) VALUES (?, ?, ?) RETURNING *",
            kind.table()
        );

        let row = sqlx::query_as::<_, Lookup>(&sql)
            .bind(&id)
            .bind(name)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;

        tracing::debug!("Created {}: {} ({})", kind.entity_name(), name, id);
        Ok(row)
    }

    /// Insert a lookup row unless one with the same name exists.
    ///
    /// Returns true when a row was inserted.
    pub async fn ensure_lookup(&self, kind: LookupKind, name: &str) -> Result<bool> {
        let sql = format!(
            r#"
            INSERT INTO {table} (id, name, created_at)
            SELECT ?, ?, ?
            WHERE NOT EXISTS (SELECT 1 FROM {table} WHERE name = ?)
            "#,
            table = kind.table()
        );

        let inserted = sqlx::query(&sql)
            .bind(Uuid::new_v4().to_string())
            .bind(name)
            .bind(Utc::now())
            .bind(name)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(inserted > 0)
    }

    /// Rename a lookup row
    pub async fn rename_lookup(&self, kind: LookupKind, id: &str, name: &str) -> Result<Lookup> {
        let sql = format!("UPDATE {} SET name = ? WHERE id = ? RETURNING *", kind.table());
        let row = sqlx::query_as::<_, Lookup>(&sql)
            .bind(name)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found(kind.entity_name(), id))?;

        tracing::debug!("Renamed {} {} to {}", kind.entity_name(), id, name);
        Ok(row)
    }

    /// Number of students or education records referencing a lookup row.
    /// Archived records count too.
    pub async fn count_lookup_references(&self, kind: LookupKind, id: &str) -> Result<i64> {
        let sql = match kind {
            LookupKind::Department => "SELECT COUNT(*) FROM students WHERE department_id = ?",
            LookupKind::Institute => "SELECT COUNT(*) FROM education_records WHERE institute_id = ?",
            LookupKind::Degree => "SELECT COUNT(*) FROM education_records WHERE degree_id = ?",
        };

        let count: i64 = sqlx::query_scalar(sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Delete a lookup row that nothing references
    pub async fn delete_lookup(&self, kind: LookupKind, id: &str) -> Result<()> {
        let dependents = self.count_lookup_references(kind, id).await?;
        if dependents > 0 {
            return Err(AppError::InUse {
                entity: kind.entity_name(),
                id: id.to_string(),
                dependents,
            });
        }

        let sql = format!("DELETE FROM {} WHERE id = ?", kind.table());
        let rows = sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(AppError::not_found(kind.entity_name(), id));
        }

        tracing::debug!("Deleted {}: {}", kind.entity_name(), id);
        Ok(())
    }

    // ===== Students =====

    /// Create a new student, deriving its percentage
    pub async fn create_student(&self, new: NewStudent) -> Result<Student> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let percentage = compute_percentage(new.total_marks, new.obtained_marks);

        let student = sqlx::query_as::<_, Student>(
            r#"
            INSERT INTO students (
                id, status, name, father_name, age, grade, address, department_id,
                gender, total_marks, obtained_marks, percentage, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(RecordStatus::Active)
        .bind(&new.name)
        .bind(&new.father_name)
        .bind(new.age)
        .bind(&new.grade)
        .bind(&new.address)
        .bind(&new.department_id)
        .bind(new.gender)
        .bind(new.total_marks)
        .bind(new.obtained_marks)
        .bind(percentage)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Created student: {}", id);
        Ok(student)
    }

    /// Get a student by ID, whatever its status
    pub async fn get_student(&self, id: &str) -> Result<Student> {
        sqlx::query_as::<_, Student>("SELECT * FROM students WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("Student", id))
    }

    /// Get a student together with its department name
    pub async fn get_student_detail(&self, id: &str) -> Result<StudentDetail> {
        let sql = format!("{} WHERE s.id = ?", STUDENT_DETAIL_SELECT);
        sqlx::query_as::<_, StudentDetail>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("Student", id))
    }

    /// List active students
    pub async fn list_students(&self) -> Result<Vec<Student>> {
        let students = sqlx::query_as::<_, Student>(
            r#"
            SELECT * FROM students
            WHERE status = ?
            ORDER BY name ASC, created_at ASC
            "#,
        )
        .bind(RecordStatus::Active)
        .fetch_all(&self.pool)
        .await?;

        Ok(students)
    }

    /// List every student including archived ones
    pub async fn list_all_students(&self) -> Result<Vec<Student>> {
        let students = sqlx::query_as::<_, Student>(
            "SELECT * FROM students ORDER BY name ASC, created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(students)
    }

    /// List active students with department names, optionally for one department
    pub async fn list_student_details(&self, department_id: Option<&str>) -> Result<Vec<StudentDetail>> {
        let rows = match department_id {
            Some(department_id) => {
                let sql = format!(
                    "{} WHERE s.status = ? AND s.department_id = ? ORDER BY s.name ASC, s.created_at ASC",
                    STUDENT_DETAIL_SELECT
                );
                sqlx::query_as::<_, StudentDetail>(&sql)
                    .bind(RecordStatus::Active)
                    .bind(department_id)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!(
                    "{} WHERE s.status = ? ORDER BY s.name ASC, s.created_at ASC",
                    STUDENT_DETAIL_SELECT
                );
                sqlx::query_as::<_, StudentDetail>(&sql)
                    .bind(RecordStatus::Active)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(rows)
    }

    /// List every student of one department with department names, archived included
    pub async fn list_all_student_details(&self, department_id: &str) -> Result<Vec<StudentDetail>> {
        let sql = format!(
            "{} WHERE s.department_id = ? ORDER BY s.name ASC, s.created_at ASC",
            STUDENT_DETAIL_SELECT
        );
        let rows = sqlx::query_as::<_, StudentDetail>(&sql)
            .bind(department_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    /// Update a student.
    ///
    /// The percentage is recomputed here whenever either mark changes, so
    /// no caller can store a stale value.
    pub async fn update_student(&self, req: UpdateStudentRequest) -> Result<Student> {
        let current = self.get_student(&req.id).await?;
        let marks_changed = req.touches_marks();

        let total_marks = req.total_marks.unwrap_or(current.total_marks);
        let obtained_marks = req.obtained_marks.unwrap_or(current.obtained_marks);
        let percentage = if marks_changed {
            compute_percentage(total_marks, obtained_marks)
        } else {
            current.percentage
        };

        let name = req.name.unwrap_or(current.name);
        let father_name = match req.father_name {
            Some(v) => normalize_text(Some(v)),
            None => current.father_name,
        };
        let grade = match req.grade {
            Some(v) => normalize_text(Some(v)),
            None => current.grade,
        };
        let address = match req.address {
            Some(v) => normalize_text(Some(v)),
            None => current.address,
        };
        let department_id = req.department_id.unwrap_or(current.department_id);
        let gender = if req.clear_gender { None } else { req.gender.or(current.gender) };
        let age = req.age.unwrap_or(current.age);

        let student = sqlx::query_as::<_, Student>(
            r#"
            UPDATE students SET
                name = ?, father_name = ?, age = ?, grade = ?, address = ?,
                department_id = ?, gender = ?, total_marks = ?, obtained_marks = ?,
                percentage = ?, updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&name)
        .bind(&father_name)
        .bind(age)
        .bind(&grade)
        .bind(&address)
        .bind(&department_id)
        .bind(gender)
        .bind(total_marks)
        .bind(obtained_marks)
        .bind(percentage)
        .bind(Utc::now())
        .bind(&req.id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::not_found("Student", req.id.clone()))?;

        if marks_changed {
            tracing::debug!("Recomputed percentage for {}: {:.2}", student.id, student.percentage);
        }
        Ok(student)
    }

    /// Move a student between active and archived
    pub async fn set_student_status(&self, id: &str, status: RecordStatus) -> Result<Student> {
        let student = sqlx::query_as::<_, Student>(
            "UPDATE students SET status = ?, updated_at = ? WHERE id = ? RETURNING *",
        )
        .bind(status)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::not_found("Student", id))?;

        tracing::debug!("Student {} is now {}", id, status.as_str());
        Ok(student)
    }

    /// Permanently delete a student and, through the foreign key, its education history
    pub async fn delete_student(&self, id: &str) -> Result<()> {
        let rows = sqlx::query("DELETE FROM students WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(AppError::not_found("Student", id));
        }

        tracing::debug!("Hard deleted student: {}", id);
        Ok(())
    }

    // ===== Education =====

    /// Create an education record for a student
    pub async fn create_education(
        &self,
        student_id: &str,
        institute_id: &str,
        degree_id: &str,
        passing_year: Option<i64>,
    ) -> Result<EducationRecord> {
        let id = Uuid::new_v4().to_string();

        let record = sqlx::query_as::<_, EducationRecord>(
            r#"
            INSERT INTO education_records (id, student_id, institute_id, degree_id, passing_year, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(student_id)
        .bind(institute_id)
        .bind(degree_id)
        .bind(passing_year)
        .bind(RecordStatus::Active)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Created education record: {} for student: {}", id, student_id);
        Ok(record)
    }

    /// List active education records of a student with resolved names
    pub async fn list_education_details(&self, student_id: &str) -> Result<Vec<EducationDetail>> {
        let rows = sqlx::query_as::<_, EducationDetail>(
            r#"
            SELECT e.*, i.name AS institute_name, g.name AS degree_name
            FROM education_records e
            LEFT JOIN institutes i ON i.id = e.institute_id
            LEFT JOIN degrees g ON g.id = e.degree_id
            WHERE e.student_id = ? AND e.status = ?
            ORDER BY e.created_at ASC
            "#,
        )
        .bind(student_id)
        .bind(RecordStatus::Active)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Delete an education record
    pub async fn delete_education(&self, id: &str) -> Result<()> {
        let rows = sqlx::query("DELETE FROM education_records WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(AppError::not_found("Education record", id));
        }

        tracing::debug!("Deleted education record: {}", id);
        Ok(())
    }

    // ===== Attachments =====

    /// Create an attachment row for a blob already in the store
    pub async fn create_attachment(
        &self,
        name: &str,
        mime_type: &str,
        blob_hash: &str,
        size: i64,
        link: Option<&RecordLink>,
    ) -> Result<Attachment> {
        let id = Uuid::new_v4().to_string();

        let attachment = sqlx::query_as::<_, Attachment>(
            r#"
            INSERT INTO attachments (id, name, mime_type, blob_hash, size, linked_record_type, linked_record_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(name)
        .bind(mime_type)
        .bind(blob_hash)
        .bind(size)
        .bind(link.map(|l| l.record_type.as_str()))
        .bind(link.and_then(|l| l.record_id.as_deref()))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Created attachment: {} ({})", id, name);
        Ok(attachment)
    }

    /// Get an attachment by ID
    pub async fn get_attachment(&self, id: &str) -> Result<Attachment> {
        sqlx::query_as::<_, Attachment>("SELECT * FROM attachments WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("Attachment", id))
    }

    /// List attachments linked to a record type, optionally a specific record
    pub async fn list_attachments(&self, record_type: &str, record_id: Option<&str>) -> Result<Vec<Attachment>> {
        let attachments = match record_id {
            Some(record_id) => {
                sqlx::query_as::<_, Attachment>(
                    r#"
                    SELECT * FROM attachments
                    WHERE linked_record_type = ? AND linked_record_id = ?
                    ORDER BY created_at DESC
                    "#,
                )
                .bind(record_type)
                .bind(record_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Attachment>(
                    r#"
                    SELECT * FROM attachments
                    WHERE linked_record_type = ?
                    ORDER BY created_at DESC
                    "#,
                )
                .bind(record_type)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(attachments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::create_memory_pool;

    async fn create_test_repo() -> Repository {
        Repository::new(create_memory_pool().await.unwrap())
    }

    fn new_student(name: &str, department_id: &str, total: f64, obtained: f64) -> NewStudent {
        NewStudent {
            name: name.to_string(),
            father_name: None,
            age: 20,
            grade: None,
            address: None,
            department_id: department_id.to_string(),
            gender: None,
            total_marks: total,
            obtained_marks: obtained,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_student() {
        let repo = create_test_repo().await;
        let dept = repo.create_lookup(LookupKind::Department, "MATH").await.unwrap();

        let student = repo
            .create_student(new_student("Ayesha", &dept.id, 500.0, 400.0))
            .await
            .unwrap();
        assert_eq!(student.percentage, 80.0);
        assert!(student.is_active());

        let detail = repo.get_student_detail(&student.id).await.unwrap();
        assert_eq!(detail.student.name, "Ayesha");
        assert_eq!(detail.department_name.as_deref(), Some("MATH"));
    }

    #[tokio::test]
    async fn test_update_recomputes_percentage_on_either_mark() {
        let repo = create_test_repo().await;
        let dept = repo.create_lookup(LookupKind::Department, "BSCS").await.unwrap();
        let student = repo
            .create_student(new_student("Bilal", &dept.id, 100.0, 50.0))
            .await
            .unwrap();

        let updated = repo
            .update_student(UpdateStudentRequest {
                id: student.id.clone(),
                obtained_marks: Some(75.0),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.percentage, 75.0);

        let updated = repo
            .update_student(UpdateStudentRequest {
                id: student.id.clone(),
                total_marks: Some(0.0),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.percentage, 0.0);
        assert_eq!(updated.obtained_marks, 75.0);
    }

    #[tokio::test]
    async fn test_update_clears_blank_text() {
        let repo = create_test_repo().await;
        let dept = repo.create_lookup(LookupKind::Department, "BBA").await.unwrap();
        let mut new = new_student("Sara", &dept.id, 10.0, 5.0);
        new.grade = Some("B".to_string());
        let student = repo.create_student(new).await.unwrap();

        let updated = repo
            .update_student(UpdateStudentRequest {
                id: student.id,
                grade: Some("  ".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.grade, None);
        assert_eq!(updated.percentage, 50.0);
    }

    #[tokio::test]
    async fn test_update_sets_and_clears_gender() {
        let repo = create_test_repo().await;
        let dept = repo.create_lookup(LookupKind::Department, "BIOLOGY").await.unwrap();
        let student = repo.create_student(new_student("Hina", &dept.id, 10.0, 5.0)).await.unwrap();

        let updated = repo
            .update_student(UpdateStudentRequest {
                id: student.id.clone(),
                gender: Some(Gender::Female),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.gender, Some(Gender::Female));

        let updated = repo
            .update_student(UpdateStudentRequest {
                id: student.id.clone(),
                grade: Some("A".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.gender, Some(Gender::Female));

        let updated = repo
            .update_student(UpdateStudentRequest {
                id: student.id,
                clear_gender: true,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.gender, None);
    }

    #[tokio::test]
    async fn test_archived_hidden_from_default_listing() {
        let repo = create_test_repo().await;
        let dept = repo.create_lookup(LookupKind::Department, "PHYSICS").await.unwrap();
        let a = repo.create_student(new_student("A", &dept.id, 1.0, 1.0)).await.unwrap();
        repo.create_student(new_student("B", &dept.id, 1.0, 1.0)).await.unwrap();

        repo.set_student_status(&a.id, RecordStatus::Archived).await.unwrap();

        assert_eq!(repo.list_students().await.unwrap().len(), 1);
        assert_eq!(repo.list_all_students().await.unwrap().len(), 2);
        assert_eq!(repo.list_student_details(Some(&dept.id)).await.unwrap().len(), 1);
        assert_eq!(repo.list_all_student_details(&dept.id).await.unwrap().len(), 2);

        let archived = repo.get_student(&a.id).await.unwrap();
        assert_eq!(archived.status, RecordStatus::Archived);
    }

    #[tokio::test]
    async fn test_ensure_lookup_is_idempotent() {
        let repo = create_test_repo().await;

        assert!(repo.ensure_lookup(LookupKind::Degree, "BSc").await.unwrap());
        assert!(!repo.ensure_lookup(LookupKind::Degree, "BSc").await.unwrap());

        let degrees = repo.list_lookups(LookupKind::Degree).await.unwrap();
        assert_eq!(degrees.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_lookup_in_use_is_refused() {
        let repo = create_test_repo().await;
        let dept = repo.create_lookup(LookupKind::Department, "COMMERCE").await.unwrap();
        let student = repo.create_student(new_student("C", &dept.id, 1.0, 1.0)).await.unwrap();

        let err = repo.delete_lookup(LookupKind::Department, &dept.id).await.unwrap_err();
        assert!(matches!(err, AppError::InUse { dependents: 1, .. }));

        repo.delete_student(&student.id).await.unwrap();
        repo.delete_lookup(LookupKind::Department, &dept.id).await.unwrap();
        assert!(repo.list_lookups(LookupKind::Department).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_student_cascades_education() {
        let repo = create_test_repo().await;
        let dept = repo.create_lookup(LookupKind::Department, "MATH").await.unwrap();
        let inst = repo.create_lookup(LookupKind::Institute, "Punjab").await.unwrap();
        let degree = repo.create_lookup(LookupKind::Degree, "FSc").await.unwrap();
        let student = repo.create_student(new_student("D", &dept.id, 1.0, 1.0)).await.unwrap();

        repo.create_education(&student.id, &inst.id, &degree.id, Some(2019))
            .await
            .unwrap();

        let history = repo.list_education_details(&student.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].institute_name.as_deref(), Some("Punjab"));
        assert_eq!(history[0].degree_name.as_deref(), Some("FSc"));

        repo.delete_student(&student.id).await.unwrap();

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM education_records")
            .fetch_one(&repo.pool)
            .await
            .unwrap();
        assert_eq!(remaining, 0);

        // Institute is no longer referenced once the history is gone
        repo.delete_lookup(LookupKind::Institute, &inst.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_attachments_by_link() {
        let repo = create_test_repo().await;

        let link = RecordLink::student("s-1");
        repo.create_attachment("A_Report.pdf", "application/pdf", "abc", 10, Some(&link))
            .await
            .unwrap();
        repo.create_attachment(
            "Department_Report_ALL.pdf",
            "application/pdf",
            "def",
            20,
            Some(&RecordLink::student_model()),
        )
        .await
        .unwrap();

        let for_student = repo.list_attachments("student", Some("s-1")).await.unwrap();
        assert_eq!(for_student.len(), 1);
        assert_eq!(for_student[0].name, "A_Report.pdf");

        let all = repo.list_attachments("student", None).await.unwrap();
        assert_eq!(all.len(), 2);

        let fetched = repo.get_attachment(&for_student[0].id).await.unwrap();
        assert_eq!(fetched.size, 10);
    }
}
