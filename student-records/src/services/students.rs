//! Students service
//!
//! Student lifecycle and education history. Required fields are checked
//! here, before anything is written; the derived percentage is left to the
//! repository write path.

use crate::actions::{Action, Notification, WizardDefaults, WizardKind, WizardLaunch};
use crate::database::{
    normalize_text, CreateEducationRequest, CreateStudentRequest, EducationDetail, EducationRecord,
    LookupKind, NewStudent, RecordStatus, Repository, Student, StudentDetail, UpdateStudentRequest,
};
use crate::error::{AppError, Result};
use crate::wizards::ReportType;

/// Service for managing students
#[derive(Clone)]
pub struct StudentsService {
    repo: Repository,
}

impl StudentsService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Create a new student
    pub async fn create(&self, req: CreateStudentRequest) -> Result<Student> {
        let name = normalize_text(req.name).ok_or_else(|| missing("Name"))?;
        let age = req.age.ok_or_else(|| missing("Age"))?;
        let department_id = normalize_text(req.department_id).ok_or_else(|| missing("Department"))?;
        let total_marks = req.total_marks.ok_or_else(|| missing("Total Marks"))?;
        let obtained_marks = req.obtained_marks.ok_or_else(|| missing("Obtained Marks"))?;

        self.repo.get_lookup(LookupKind::Department, &department_id).await?;

        tracing::info!("Creating student: {}", name);

        let student = self
            .repo
            .create_student(NewStudent {
                name,
                father_name: normalize_text(req.father_name),
                age,
                grade: normalize_text(req.grade),
                address: normalize_text(req.address),
                department_id,
                gender: req.gender,
                total_marks,
                obtained_marks,
            })
            .await?;

        tracing::info!("Student created successfully: {}", student.id);
        Ok(student)
    }

    /// Get a student with its department name
    pub async fn get(&self, id: &str) -> Result<StudentDetail> {
        self.repo.get_student_detail(id).await
    }

    /// List active students
    pub async fn list(&self) -> Result<Vec<Student>> {
        self.repo.list_students().await
    }

    /// List students including archived ones
    pub async fn list_all(&self) -> Result<Vec<Student>> {
        self.repo.list_all_students().await
    }

    /// List students of one department, archived ones only on request
    pub async fn list_by_department(&self, department_id: &str, include_archived: bool) -> Result<Vec<StudentDetail>> {
        if include_archived {
            self.repo.list_all_student_details(department_id).await
        } else {
            self.repo.list_student_details(Some(department_id)).await
        }
    }

    /// Update a student. Required fields may be changed but not cleared.
    pub async fn update(&self, mut req: UpdateStudentRequest) -> Result<Student> {
        tracing::debug!("Updating student: {}", req.id);

        if let Some(name) = req.name.take() {
            req.name = Some(normalize_text(Some(name)).ok_or_else(|| missing("Name"))?);
        }
        if let Some(department_id) = req.department_id.take() {
            let department_id = normalize_text(Some(department_id)).ok_or_else(|| missing("Department"))?;
            self.repo.get_lookup(LookupKind::Department, &department_id).await?;
            req.department_id = Some(department_id);
        }

        let student = self.repo.update_student(req).await?;

        tracing::debug!("Student updated successfully: {}", student.id);
        Ok(student)
    }

    /// Confirm a saved record
    pub async fn save(&self, id: &str) -> Result<Action> {
        self.repo.get_student(id).await?;

        Ok(Notification::success("Saved!", "Student record has been saved successfully.").into())
    }

    /// Archive exactly one student
    pub async fn archive(&self, ids: &[String]) -> Result<Action> {
        let id = single_target(ids)?;
        let student = self.repo.set_student_status(id, RecordStatus::Archived).await?;

        tracing::info!("Student archived: {}", student.id);
        Ok(Notification::warning(
            "Archived!",
            format!("Student {} has been archived.", student.name),
        )
        .into())
    }

    /// Restore exactly one archived student
    pub async fn restore(&self, ids: &[String]) -> Result<Action> {
        let id = single_target(ids)?;
        let student = self.repo.set_student_status(id, RecordStatus::Active).await?;

        tracing::info!("Student restored: {}", student.id);
        Ok(Notification::success(
            "Restored!",
            format!("Student {} has been restored.", student.name),
        )
        .into())
    }

    /// Permanently delete a student and its education history
    pub async fn delete(&self, id: &str) -> Result<()> {
        tracing::info!("Deleting student: {}", id);
        self.repo.delete_student(id).await
    }

    // ===== Education history =====

    pub async fn add_education(&self, req: CreateEducationRequest) -> Result<EducationRecord> {
        let institute_id = normalize_text(req.institute_id).ok_or_else(|| missing("Institute"))?;
        let degree_id = normalize_text(req.degree_id).ok_or_else(|| missing("Degree"))?;

        self.repo.get_student(&req.student_id).await?;
        self.repo.get_lookup(LookupKind::Institute, &institute_id).await?;
        self.repo.get_lookup(LookupKind::Degree, &degree_id).await?;

        let record = self
            .repo
            .create_education(&req.student_id, &institute_id, &degree_id, req.passing_year)
            .await?;

        tracing::info!("Education record {} added to student {}", record.id, req.student_id);
        Ok(record)
    }

    pub async fn list_education(&self, student_id: &str) -> Result<Vec<EducationDetail>> {
        self.repo.list_education_details(student_id).await
    }

    pub async fn remove_education(&self, id: &str) -> Result<()> {
        tracing::info!("Removing education record: {}", id);
        self.repo.delete_education(id).await
    }

    // ===== Wizard launchers =====

    /// Open the report wizard preset to this student and its department
    pub async fn open_report_wizard(&self, id: &str) -> Result<Action> {
        let student = self.repo.get_student(id).await?;

        Ok(Action::OpenWizard(WizardLaunch {
            title: "Generate Report".to_string(),
            wizard: WizardKind::ReportSelection,
            defaults: WizardDefaults {
                report_type: ReportType::Single,
                student_id: Some(student.id),
                department_id: Some(student.department_id),
                email_to: None,
            },
        }))
    }

    /// Open the email wizard preset to this student
    pub async fn open_email_wizard(&self, id: &str) -> Result<Action> {
        let student = self.repo.get_student(id).await?;

        Ok(Action::OpenWizard(WizardLaunch {
            title: "Send Report by Email".to_string(),
            wizard: WizardKind::Email,
            defaults: WizardDefaults {
                report_type: ReportType::Single,
                student_id: Some(student.id),
                department_id: None,
                email_to: Some(String::new()),
            },
        }))
    }
}

fn missing(field: &str) -> AppError {
    AppError::validation(format!("Missing required field: {}", field))
}

fn single_target(ids: &[String]) -> Result<&str> {
    match ids {
        [id] => Ok(id.as_str()),
        _ => Err(AppError::validation(format!(
            "Expected exactly one student record, got {}.",
            ids.len()
        ))),
    }
}
