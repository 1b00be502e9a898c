use sqlx::{PgConnection, PgPool};
use tracing::{info, warn};
use uuid::Uuid;

use crate::applications::validation::{ApplicantFilters, NewApplication};
use crate::db::{contains_pattern, is_unique_violation};
use crate::errors::AppError;
use crate::models::application::{ApplicationRow, ApplicationStatus};
use crate::notifications::Notifier;
use crate::pagination::{Page, PageRequest, Sort, SortDirection, SortRules};
use crate::storage::ResumeStorage;

const APPLICATION_SELECT: &str = r#"
    SELECT a.id, a.applicant_id, ap.name AS applicant_name, ap.email AS applicant_email,
           a.job_id, j.title AS job_title, j.status AS job_status,
           j.created_by AS company_id, c.name AS company_name, c.email AS company_email,
           a.resume_link, a.cover_letter, a.status, a.applied_at, a.updated_at
    FROM applications a
    JOIN users ap ON ap.id = a.applicant_id
    JOIN jobs j ON j.id = a.job_id
    JOIN users c ON c.id = j.created_by
"#;

const ALREADY_APPLIED: &str = "You have already applied for this job";

pub const APPLICANT_SORT: SortRules = SortRules {
    allowed: &[
        ("appliedAt", "a.applied_at"),
        ("updatedAt", "a.updated_at"),
        ("status", "a.status"),
        ("jobTitle", "j.title"),
        ("jobStatus", "j.status"),
        ("companyName", "c.name"),
    ],
    default: Sort::new("a.applied_at", SortDirection::Desc),
    explicit_direction: SortDirection::Desc,
};

/// Applications for one job are always newest first.
pub const JOB_APPLICATIONS_SORT: Sort = Sort::new("a.applied_at", SortDirection::Desc);

async fn fetch_application(
    conn: &mut PgConnection,
    application_id: Uuid,
) -> Result<ApplicationRow, AppError> {
    sqlx::query_as(&format!("{APPLICATION_SELECT} WHERE a.id = $1"))
        .bind(application_id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Application not found".to_string()))
}

/// Submits an application with its resume and notifies the job's company.
///
/// The resume is stored before the row is written; if the write or commit
/// fails the stored file is removed again.
pub async fn apply(
    pool: &PgPool,
    resumes: &ResumeStorage,
    notifier: &Notifier,
    applicant_id: Uuid,
    application: NewApplication,
) -> Result<ApplicationRow, AppError> {
    let job_id = application.job_id;
    info!("Applicant {applicant_id} applying to job {job_id}");

    let mut tx = pool.begin().await?;

    let applicant_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(applicant_id)
            .fetch_one(&mut *tx)
            .await?;
    if !applicant_exists {
        return Err(AppError::NotFound("Applicant not found".to_string()));
    }

    let job_exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM jobs WHERE id = $1)")
        .bind(job_id)
        .fetch_one(&mut *tx)
        .await?;
    if !job_exists {
        return Err(AppError::NotFound("Job not found".to_string()));
    }

    let already_applied: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM applications WHERE applicant_id = $1 AND job_id = $2)",
    )
    .bind(applicant_id)
    .bind(job_id)
    .fetch_one(&mut *tx)
    .await?;
    if already_applied {
        return Err(AppError::Conflict(ALREADY_APPLIED.to_string()));
    }

    let resume_link = resumes.upload(application.resume).await?;

    let stored = insert_application(
        &mut *tx,
        applicant_id,
        job_id,
        &resume_link,
        application.cover_letter.as_deref(),
    )
    .await;
    let row = match stored {
        Ok(row) => row,
        Err(e) => {
            resumes.delete(&resume_link).await;
            return Err(e);
        }
    };
    if let Err(e) = tx.commit().await {
        resumes.delete(&resume_link).await;
        return Err(e.into());
    }

    notifier.send_new_application(
        &row.company_email,
        &row.company_name,
        &row.job_title,
        &row.applicant_name,
    );
    info!("Application {} created for job {job_id}", row.id);
    Ok(row)
}

async fn insert_application(
    conn: &mut PgConnection,
    applicant_id: Uuid,
    job_id: Uuid,
    resume_link: &str,
    cover_letter: Option<&str>,
) -> Result<ApplicationRow, AppError> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO applications (id, applicant_id, job_id, resume_link, cover_letter, status)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(id)
    .bind(applicant_id)
    .bind(job_id)
    .bind(resume_link)
    .bind(cover_letter)
    .bind(ApplicationStatus::Applied)
    .execute(&mut *conn)
    .await
    .map_err(|e| {
        if is_unique_violation(&e, Some("applications_applicant_job_key")) {
            AppError::Conflict(ALREADY_APPLIED.to_string())
        } else {
            AppError::Database(e)
        }
    })?;

    fetch_application(conn, id).await
}

/// The caller's own applications, filtered and paged.
pub async fn list_for_applicant(
    pool: &PgPool,
    applicant_id: Uuid,
    filters: &ApplicantFilters,
    page: &PageRequest,
) -> Result<Page<ApplicationRow>, AppError> {
    info!("Listing applications of applicant {applicant_id} with {filters:?}");
    let sort = APPLICANT_SORT.resolve(page)?;

    let company = contains_pattern(filters.company_name.as_deref());
    let statuses: Option<Vec<String>> = filters
        .statuses
        .as_ref()
        .map(|list| list.iter().map(|s| s.as_str().to_string()).collect());

    const FILTER: &str = r#"
        WHERE a.applicant_id = $1
          AND ($2::text IS NULL OR c.name ILIKE $2)
          AND ($3::job_status IS NULL OR j.status = $3)
          AND ($4::text[] IS NULL OR a.status::text = ANY($4))
    "#;

    let rows: Vec<ApplicationRow> = sqlx::query_as(&format!(
        "{APPLICATION_SELECT} {FILTER} ORDER BY {} LIMIT $5 OFFSET $6",
        sort.to_sql("a.id")
    ))
    .bind(applicant_id)
    .bind(&company)
    .bind(filters.job_status)
    .bind(&statuses)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar(&format!(
        r#"
        SELECT COUNT(*)
        FROM applications a
        JOIN jobs j ON j.id = a.job_id
        JOIN users c ON c.id = j.created_by
        {FILTER}
        "#
    ))
    .bind(applicant_id)
    .bind(&company)
    .bind(filters.job_status)
    .bind(&statuses)
    .fetch_one(pool)
    .await?;

    Ok(Page::new(rows, page, total))
}

/// Applications received for one job. Only the job's owner may list them;
/// an unknown job and someone else's job are rejected alike.
pub async fn list_for_job(
    pool: &PgPool,
    job_id: Uuid,
    owner_id: Uuid,
    status: Option<ApplicationStatus>,
    page: &PageRequest,
) -> Result<Page<ApplicationRow>, AppError> {
    info!("Company {owner_id} listing applications for job {job_id}");

    let owns_job: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM jobs WHERE id = $1 AND created_by = $2)")
            .bind(job_id)
            .bind(owner_id)
            .fetch_one(pool)
            .await?;
    if !owns_job {
        return Err(AppError::Forbidden("Unauthorized access".to_string()));
    }

    const FILTER: &str =
        "WHERE a.job_id = $1 AND ($2::application_status IS NULL OR a.status = $2)";

    let rows: Vec<ApplicationRow> = sqlx::query_as(&format!(
        "{APPLICATION_SELECT} {FILTER} ORDER BY {} LIMIT $3 OFFSET $4",
        JOB_APPLICATIONS_SORT.to_sql("a.id")
    ))
    .bind(job_id)
    .bind(status)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM applications a {FILTER}"))
        .bind(job_id)
        .bind(status)
        .fetch_one(pool)
        .await?;

    Ok(Page::new(rows, page, total))
}

/// Moves an application to any status. The lookup is scoped to the job's
/// owner, so a missing application and a foreign one fail the same way.
/// INTERVIEW, REJECTED and HIRED email the applicant after commit.
pub async fn update_status(
    pool: &PgPool,
    notifier: &Notifier,
    application_id: Uuid,
    owner_id: Uuid,
    status: ApplicationStatus,
) -> Result<ApplicationRow, AppError> {
    info!("Company {owner_id} setting application {application_id} to {status}");

    let mut tx = pool.begin().await?;

    let previous: Option<ApplicationStatus> = sqlx::query_scalar(
        r#"
        SELECT a.status
        FROM applications a
        JOIN jobs j ON j.id = a.job_id
        WHERE a.id = $1 AND j.created_by = $2
        FOR UPDATE OF a
        "#,
    )
    .bind(application_id)
    .bind(owner_id)
    .fetch_optional(&mut *tx)
    .await?;
    let Some(previous) = previous else {
        warn!("Company {owner_id} may not update application {application_id}");
        return Err(AppError::Forbidden("Unauthorized".to_string()));
    };

    sqlx::query("UPDATE applications SET status = $2, updated_at = NOW() WHERE id = $1")
        .bind(application_id)
        .bind(status)
        .execute(&mut *tx)
        .await?;

    let row = fetch_application(&mut *tx, application_id).await?;
    tx.commit().await?;

    notifier.send_status_update(
        &row.applicant_email,
        &row.applicant_name,
        &row.job_title,
        &row.company_name,
        status,
    );
    info!("Application {application_id} moved from {previous} to {status}");
    Ok(row)
}
