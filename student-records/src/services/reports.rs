//! Report generation service
//!
//! Aggregates students into typed rows, synthesizes HTML, rasterizes it to
//! PDF and stores the result as an attachment. The caller gets back an
//! action that opens the download URL.

use crate::actions::Action;
use crate::config::{ALL_DEPARTMENTS_LABEL, PDF_MIME_TYPE};
use crate::database::{Attachment, LookupKind, RecordLink, Repository};
use crate::error::{AppError, Result};
use crate::reporting::html::{render_department_report, render_student_report};
use crate::reporting::rows::DepartmentStudentRow;
use crate::reporting::{DepartmentReport, PdfRenderer, StudentReport};
use crate::services::AttachmentsService;
use crate::wizards::DepartmentTarget;
use std::sync::Arc;

/// Service producing department and single-student reports
#[derive(Clone)]
pub struct ReportService {
    repo: Repository,
    attachments: AttachmentsService,
    renderer: Arc<dyn PdfRenderer>,
}

impl ReportService {
    pub fn new(repo: Repository, attachments: AttachmentsService, renderer: Arc<dyn PdfRenderer>) -> Self {
        Self {
            repo,
            attachments,
            renderer,
        }
    }

    /// Build the department report data without rendering it
    pub async fn build_department_report(&self, target: DepartmentTarget) -> Result<DepartmentReport> {
        let departments = self.repo.list_lookups(LookupKind::Department).await?;
        if departments.is_empty() {
            return Err(AppError::validation("No departments found."));
        }

        let selected = match target {
            DepartmentTarget::All => None,
            DepartmentTarget::Department(id) => {
                let department = self.repo.get_lookup(LookupKind::Department, &id).await?;
                // The seeded "ALL" department stands for every department
                if department.name == ALL_DEPARTMENTS_LABEL {
                    None
                } else {
                    Some(department)
                }
            }
        };

        let report = match selected {
            Some(department) => {
                let students = self.repo.list_student_details(Some(&department.id)).await?;
                let rows = students.iter().map(DepartmentStudentRow::from).collect();
                DepartmentReport::build(&department.name, &[department.name.clone()], rows)
            }
            None => {
                let students = self.repo.list_student_details(None).await?;
                let scope: Vec<String> = departments
                    .into_iter()
                    .map(|d| d.name)
                    .filter(|name| name != ALL_DEPARTMENTS_LABEL)
                    .collect();
                let rows = students.iter().map(DepartmentStudentRow::from).collect();
                DepartmentReport::build(ALL_DEPARTMENTS_LABEL, &scope, rows)
            }
        };

        tracing::debug!(
            "Department report {}: {} groups, {} students",
            report.label,
            report.groups.len(),
            report.student_count()
        );
        Ok(report)
    }

    /// Generate, store and open a department report
    pub async fn department_report(&self, target: DepartmentTarget) -> Result<Action> {
        let report = self.build_department_report(target).await?;
        let html = render_department_report(&report);

        let attachment = self
            .render_and_store(&report.file_name(), html, RecordLink::student_model())
            .await?;

        tracing::info!("Department report generated: {}", attachment.id);
        Ok(Action::open_url(self.attachments.download_url(&attachment)))
    }

    /// Build the single-student report data without rendering it
    pub async fn build_student_report(&self, student_id: &str) -> Result<StudentReport> {
        let detail = self.repo.get_student_detail(student_id).await?;
        let education = self.repo.list_education_details(student_id).await?;
        Ok(StudentReport::build(&detail, &education))
    }

    /// Generate, store and open a single-student report
    pub async fn student_report(&self, student_id: &str) -> Result<Action> {
        let report = self.build_student_report(student_id).await?;
        let html = render_student_report(&report);

        let attachment = self
            .render_and_store(&report.file_name(), html, RecordLink::student(&report.student_id))
            .await?;

        tracing::info!("Student report generated: {}", attachment.id);
        Ok(Action::open_url(self.attachments.download_url(&attachment)))
    }

    /// Rasterize off the async runtime, then persist. Nothing is stored
    /// unless rendering succeeded.
    async fn render_and_store(&self, name: &str, html: String, link: RecordLink) -> Result<Attachment> {
        let renderer = Arc::clone(&self.renderer);
        let pdf = tokio::task::spawn_blocking(move || renderer.render(&html))
            .await
            .map_err(|e| AppError::Rendering(format!("PDF creation failed: {}", e)))?
            .map_err(|e| AppError::Rendering(format!("PDF creation failed: {}", e)))?;

        self.attachments
            .create_attachment(name, PDF_MIME_TYPE, &pdf, Some(&link))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MAX_ATTACHMENT_NAME_LENGTH;
    use crate::database::{create_memory_pool, NewStudent};
    use crate::reporting::BuiltinPdfRenderer;
    use crate::storage::BlobStore;
    use tempfile::TempDir;

    struct FailingRenderer;

    impl PdfRenderer for FailingRenderer {
        fn render(&self, _html: &str) -> Result<Vec<u8>> {
            Err(AppError::Rendering("engine crashed".to_string()))
        }
    }

    async fn create_test_service(renderer: Arc<dyn PdfRenderer>) -> (ReportService, Repository, TempDir) {
        let repo = Repository::new(create_memory_pool().await.unwrap());
        let temp_dir = TempDir::new().unwrap();
        let blob_store = BlobStore::new(temp_dir.path().join("blobs"));
        blob_store.initialize().await.unwrap();

        let attachments = AttachmentsService::new(repo.clone(), blob_store, "/web/content");
        (ReportService::new(repo.clone(), attachments, renderer), repo, temp_dir)
    }

    fn new_student(name: &str, department_id: &str) -> NewStudent {
        NewStudent {
            name: name.to_string(),
            father_name: None,
            age: 20,
            grade: Some("A".to_string()),
            address: None,
            department_id: department_id.to_string(),
            gender: None,
            total_marks: 80.0,
            obtained_marks: 70.0,
        }
    }

    #[tokio::test]
    async fn test_no_departments_is_a_user_error() {
        let (service, _repo, _temp) = create_test_service(Arc::new(BuiltinPdfRenderer)).await;

        let err = service.department_report(DepartmentTarget::All).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(err.to_string(), "No departments found.");
    }

    #[tokio::test]
    async fn test_all_report_groups_every_department() {
        let (service, repo, _temp) = create_test_service(Arc::new(BuiltinPdfRenderer)).await;
        let a = repo.create_lookup(LookupKind::Department, "A").await.unwrap();
        repo.create_lookup(LookupKind::Department, "B").await.unwrap();
        repo.create_student(new_student("Ali", &a.id)).await.unwrap();
        repo.create_student(new_student("Sara", &a.id)).await.unwrap();

        let report = service.build_department_report(DepartmentTarget::All).await.unwrap();

        assert_eq!(report.label, "ALL");
        assert_eq!(report.groups.len(), 2);
        assert_eq!(report.groups[0].department, "A");
        assert_eq!(report.groups[0].rows.len(), 2);
        assert_eq!(report.groups[1].department, "B");
        assert!(report.groups[1].rows.is_empty());
    }

    #[tokio::test]
    async fn test_seeded_all_department_selects_everything() {
        let (service, repo, _temp) = create_test_service(Arc::new(BuiltinPdfRenderer)).await;
        let all = repo.create_lookup(LookupKind::Department, "ALL").await.unwrap();
        let math = repo.create_lookup(LookupKind::Department, "MATH").await.unwrap();
        repo.create_student(new_student("Ali", &math.id)).await.unwrap();

        let report = service
            .build_department_report(DepartmentTarget::Department(all.id))
            .await
            .unwrap();

        assert!(report.is_all());
        assert_eq!(report.student_count(), 1);
    }

    #[tokio::test]
    async fn test_single_department_report_is_stored_unlinked() {
        let (service, repo, _temp) = create_test_service(Arc::new(BuiltinPdfRenderer)).await;
        let dept = repo.create_lookup(LookupKind::Department, "Computer Science").await.unwrap();
        repo.create_student(new_student("Ali", &dept.id)).await.unwrap();

        let action = service
            .department_report(DepartmentTarget::Department(dept.id))
            .await
            .unwrap();

        let attachments = repo.list_attachments("student", None).await.unwrap();
        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0].name, "Department_Report_Computer_Science.pdf");
        assert_eq!(attachments[0].mime_type, "application/pdf");
        assert_eq!(attachments[0].linked_record_id, None);

        assert_eq!(
            action,
            Action::open_url(format!("/web/content/{}?download=true", attachments[0].id))
        );
    }

    #[tokio::test]
    async fn test_student_report_is_linked_to_student() {
        let (service, repo, _temp) = create_test_service(Arc::new(BuiltinPdfRenderer)).await;
        let dept = repo.create_lookup(LookupKind::Department, "MATH").await.unwrap();
        let student = repo.create_student(new_student("Ali", &dept.id)).await.unwrap();

        let report = service.build_student_report(&student.id).await.unwrap();
        assert!(report.education.is_empty());

        service.student_report(&student.id).await.unwrap();

        let attachments = repo.list_attachments("student", Some(&student.id)).await.unwrap();
        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0].name, "Ali_Report.pdf");
    }

    #[tokio::test]
    async fn test_long_student_name_keeps_report_suffix() {
        let (service, repo, _temp) = create_test_service(Arc::new(BuiltinPdfRenderer)).await;
        let dept = repo.create_lookup(LookupKind::Department, "MATH").await.unwrap();
        let name = "A".repeat(260);
        let student = repo.create_student(new_student(&name, &dept.id)).await.unwrap();

        service.student_report(&student.id).await.unwrap();

        let attachments = repo.list_attachments("student", Some(&student.id)).await.unwrap();
        assert_eq!(attachments.len(), 1);
        assert!(attachments[0].name.ends_with("_Report.pdf"));
        assert!(attachments[0].name.chars().count() <= MAX_ATTACHMENT_NAME_LENGTH);
    }

    #[tokio::test]
    async fn test_render_failure_creates_no_attachment() {
        let (service, repo, _temp) = create_test_service(Arc::new(FailingRenderer)).await;
        let dept = repo.create_lookup(LookupKind::Department, "MATH").await.unwrap();
        let student = repo.create_student(new_student("Ali", &dept.id)).await.unwrap();

        let err = service.student_report(&student.id).await.unwrap_err();
        assert!(matches!(err, AppError::Rendering(_)));
        assert!(err.to_string().contains("engine crashed"));

        assert!(repo.list_attachments("student", None).await.unwrap().is_empty());
    }
}
