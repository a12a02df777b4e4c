//! The report ledger: submit, approve, unlock, edit, delete.

use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use konsern_shared::types::{CompanyId, ReportId, UserRole};
use konsern_store::{Row, RowFilter, StoreError, TableStore, tables};

use crate::access::User;
use crate::app::ActivityHandle;

use super::error::ReportError;
use super::types::{Report, ReportEdit, ReportStatus, ReportSubmission};

/// Maintains the append-only, per-company report log and keeps the
/// company's cached snapshot in sync with it.
pub struct ReportLedger {
    store: Arc<dyn TableStore>,
    activity: ActivityHandle,
}

impl ReportLedger {
    /// Creates the ledger over a storage backend.
    #[must_use]
    pub fn new(store: Arc<dyn TableStore>, activity: ActivityHandle) -> Self {
        Self { store, activity }
    }

    /// A company's report log, newest first.
    pub async fn list(&self, company_id: CompanyId) -> Result<Vec<Report>, ReportError> {
        let rows = self
            .store
            .fetch_rows(
                tables::REPORTS,
                &RowFilter::all().eq("company_id", company_id.into_inner()),
            )
            .await?;
        let mut reports: Vec<Report> = rows.iter().map(Report::from_row).collect();
        reports.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(reports)
    }

    /// Looks up one report.
    pub async fn find(&self, id: ReportId) -> Result<Option<Report>, ReportError> {
        let rows = self
            .store
            .fetch_rows(tables::REPORTS, &RowFilter::all().eq("id", id.into_inner()))
            .await?;
        Ok(rows.first().map(Report::from_row))
    }

    /// Submits a report and merges its supplied fields into the company
    /// snapshot.
    ///
    /// The snapshot patch is not dispatched until the insert response has
    /// been observed: the audit entry references the generated report id.
    pub async fn submit(
        &self,
        company_id: CompanyId,
        submission: ReportSubmission,
        author: &User,
    ) -> Result<Report, ReportError> {
        let fields = submission.fields.with_derived_result();
        let date = submission.date.to_string();

        let mut row = fields.report_row();
        row.insert("company_id".into(), Value::from(company_id.into_inner()));
        row.insert("author_name".into(), Value::String(author.full_name.clone()));
        row.insert("date".into(), Value::String(date.clone()));
        row.insert("comment".into(), Value::String(submission.comment.clone()));
        row.insert(
            "source".into(),
            Value::String(submission.source.as_str().to_string()),
        );
        row.insert(
            "status".into(),
            Value::String(ReportStatus::Submitted.as_str().to_string()),
        );

        let inserted = self.store.insert_rows(tables::REPORTS, vec![row]).await?;
        let report = inserted
            .first()
            .map(Report::from_row)
            .ok_or_else(|| StoreError::MalformedResponse("insert returned no rows".into()))?;

        let mut snapshot = fields.snapshot_row();
        snapshot.insert("last_report_date".into(), Value::String(date));
        snapshot.insert(
            "last_report_by".into(),
            Value::String(author.full_name.clone()),
        );
        snapshot.insert("comment".into(), Value::String(submission.comment));
        self.store
            .patch_rows(tables::COMPANIES, company_id.into_inner(), snapshot)
            .await?;

        self.activity.record(
            author.full_name.clone(),
            "report_submitted",
            format!("report {} for company {company_id}", report.id),
        );
        Ok(report)
    }

    /// Approves a report.
    ///
    /// A missing report is a logged no-op, not an error; the background
    /// poll may have raced a deletion.
    pub async fn approve(
        &self,
        id: ReportId,
        approver: &User,
    ) -> Result<Option<Report>, ReportError> {
        if approver.role != UserRole::Controller {
            return Err(ReportError::ControllerRequired);
        }

        let Some(report) = self.find(id).await? else {
            warn!(report = %id, "approve: report does not exist, ignoring");
            return Ok(None);
        };
        if !ReportStatus::is_valid_transition(report.status, ReportStatus::Approved) {
            return Err(ReportError::InvalidTransition {
                from: report.status,
                to: ReportStatus::Approved,
            });
        }

        let mut fields = Row::new();
        fields.insert(
            "status".into(),
            Value::String(ReportStatus::Approved.as_str().to_string()),
        );
        fields.insert("approved_by".into(), Value::from(approver.id.into_inner()));
        fields.insert(
            "approved_at".into(),
            Value::String(chrono::Utc::now().to_rfc3339()),
        );
        let rows = self
            .store
            .patch_rows(tables::REPORTS, id.into_inner(), fields)
            .await?;

        self.activity.record(
            approver.full_name.clone(),
            "report_approved",
            format!("report {id}"),
        );
        Ok(rows.first().map(Report::from_row))
    }

    /// Unlocks an approved report back to submitted, clearing the
    /// approval stamps. Controller-only.
    pub async fn unlock(&self, id: ReportId, actor: &User) -> Result<Report, ReportError> {
        if actor.role != UserRole::Controller {
            return Err(ReportError::ControllerRequired);
        }

        let report = self.find(id).await?.ok_or(ReportError::NotFound(id))?;
        if !ReportStatus::is_valid_transition(report.status, ReportStatus::Submitted) {
            return Err(ReportError::InvalidTransition {
                from: report.status,
                to: ReportStatus::Submitted,
            });
        }

        let mut fields = Row::new();
        fields.insert(
            "status".into(),
            Value::String(ReportStatus::Submitted.as_str().to_string()),
        );
        fields.insert("approved_by".into(), Value::Null);
        fields.insert("approved_at".into(), Value::Null);
        let rows = self
            .store
            .patch_rows(tables::REPORTS, id.into_inner(), fields)
            .await?;
        let updated = rows
            .first()
            .map(Report::from_row)
            .ok_or(ReportError::NotFound(id))?;

        self.activity.record(
            actor.full_name.clone(),
            "report_unlocked",
            format!("report {id}"),
        );
        Ok(updated)
    }

    /// Edits an unapproved report, with the same partial-field semantics
    /// as submission, and propagates the subset to the company snapshot.
    pub async fn edit(
        &self,
        id: ReportId,
        edit: ReportEdit,
        actor: &User,
    ) -> Result<Report, ReportError> {
        let report = self.find(id).await?.ok_or(ReportError::NotFound(id))?;
        if !report.status.is_editable() {
            return Err(ReportError::ApprovedReadOnly(id));
        }

        let fields = edit.fields.with_derived_result();
        let mut patch = fields.report_row();
        if let Some(comment) = &edit.comment {
            patch.insert("comment".into(), Value::String(comment.clone()));
        }
        if let Some(date) = edit.date {
            patch.insert("date".into(), Value::String(date.to_string()));
        }
        if let Some(source) = edit.source {
            patch.insert("source".into(), Value::String(source.as_str().to_string()));
        }
        let rows = self
            .store
            .patch_rows(tables::REPORTS, id.into_inner(), patch)
            .await?;
        let updated = rows
            .first()
            .map(Report::from_row)
            .ok_or(ReportError::NotFound(id))?;

        let mut snapshot = fields.snapshot_row();
        if let Some(comment) = edit.comment {
            snapshot.insert("comment".into(), Value::String(comment));
        }
        if !snapshot.is_empty() {
            self.store
                .patch_rows(
                    tables::COMPANIES,
                    updated.company_id.into_inner(),
                    snapshot,
                )
                .await?;
        }

        self.activity.record(
            actor.full_name.clone(),
            "report_edited",
            format!("report {id}"),
        );
        Ok(updated)
    }

    /// Deletes an unapproved report.
    ///
    /// Approval makes a report undeletable until it is unlocked; this is
    /// enforced here, not just hidden in the UI.
    pub async fn delete(&self, id: ReportId, actor: &User) -> Result<(), ReportError> {
        let report = self.find(id).await?.ok_or(ReportError::NotFound(id))?;
        if report.status == ReportStatus::Approved {
            return Err(ReportError::ApprovedUndeletable(id));
        }

        self.store
            .delete_rows(tables::REPORTS, &[id.into_inner()])
            .await?;
        self.activity.record(
            actor.full_name.clone(),
            "report_deleted",
            format!("report {id} for company {}", report.company_id),
        );
        Ok(())
    }
}
