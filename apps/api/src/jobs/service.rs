use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::db::contains_pattern;
use crate::errors::AppError;
use crate::jobs::validation::{JobFilters, JobPatch, NewJob};
use crate::models::job::{JobRow, JobStatus, OwnedJobRow};
use crate::pagination::{Page, PageRequest, Sort, SortDirection, SortRules};
use crate::storage::ResumeStorage;

const JOB_COLUMNS: &str = r#"
    j.id, j.title, j.description, j.location, j.status, j.created_by,
    u.name AS company_name, j.created_at, j.updated_at
"#;

const NOT_OWNER: &str = "Unauthorized access";

pub const SEARCH_SORT: SortRules = SortRules {
    allowed: &[
        ("title", "j.title"),
        ("location", "j.location"),
        ("status", "j.status"),
        ("companyName", "u.name"),
        ("createdAt", "j.created_at"),
        ("updatedAt", "j.updated_at"),
    ],
    default: Sort::new("j.created_at", SortDirection::Desc),
    explicit_direction: SortDirection::Asc,
};

pub const OWNER_SORT: SortRules = SortRules {
    allowed: &[
        ("title", "j.title"),
        ("location", "j.location"),
        ("status", "j.status"),
        ("createdAt", "j.created_at"),
        ("updatedAt", "j.updated_at"),
        ("applicationCount", "application_count"),
    ],
    default: Sort::new("j.created_at", SortDirection::Desc),
    explicit_direction: SortDirection::Asc,
};

async fn fetch_job<'e, E>(executor: E, job_id: Uuid) -> Result<Option<JobRow>, sqlx::Error>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query_as(&format!(
        "SELECT {JOB_COLUMNS} FROM jobs j JOIN users u ON u.id = j.created_by WHERE j.id = $1"
    ))
    .bind(job_id)
    .fetch_optional(executor)
    .await
}

pub async fn create_job(pool: &PgPool, owner_id: Uuid, job: NewJob) -> Result<JobRow, AppError> {
    info!("Creating job for company {owner_id}");

    let mut tx = pool.begin().await?;

    let owner_exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
        .bind(owner_id)
        .fetch_one(&mut *tx)
        .await?;
    if !owner_exists {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO jobs (id, title, description, location, status, created_by)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(id)
    .bind(&job.title)
    .bind(&job.description)
    .bind(&job.location)
    .bind(job.status)
    .bind(owner_id)
    .execute(&mut *tx)
    .await?;

    let row = fetch_job(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Job {id} vanished after insert")))?;
    tx.commit().await?;

    info!("Job {id} created with status {}", row.status);
    Ok(row)
}

/// Applies a partial update. A status change must follow the job lifecycle.
pub async fn update_job(
    pool: &PgPool,
    job_id: Uuid,
    owner_id: Uuid,
    patch: JobPatch,
) -> Result<JobRow, AppError> {
    info!("Updating job {job_id} by company {owner_id}");

    let mut tx = pool.begin().await?;

    let current: Option<JobStatus> = sqlx::query_scalar(
        "SELECT status FROM jobs WHERE id = $1 AND created_by = $2 FOR UPDATE",
    )
    .bind(job_id)
    .bind(owner_id)
    .fetch_optional(&mut *tx)
    .await?;
    let current = current.ok_or_else(|| AppError::Forbidden(NOT_OWNER.to_string()))?;

    if let Some(next) = patch.status {
        if !current.can_transition_to(next) {
            return Err(AppError::InvalidTransition {
                from: current.to_string(),
                to: next.to_string(),
            });
        }
    }

    if !patch.is_empty() {
        sqlx::query(
            r#"
            UPDATE jobs
            SET title       = COALESCE($2, title),
                description = COALESCE($3, description),
                location    = CASE WHEN $4 THEN $5 ELSE location END,
                status      = COALESCE($6, status),
                updated_at  = NOW()
            WHERE id = $1
            "#,
        )
        .bind(job_id)
        .bind(&patch.title)
        .bind(&patch.description)
        .bind(patch.location.is_some())
        .bind(patch.location.clone().flatten())
        .bind(patch.status)
        .execute(&mut *tx)
        .await?;
    }

    let row = fetch_job(&mut *tx, job_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;
    tx.commit().await?;

    info!("Job {job_id} updated");
    Ok(row)
}

/// Deletes a job together with its applications. Their stored resumes are
/// removed after commit, best-effort.
pub async fn delete_job(
    pool: &PgPool,
    resumes: &ResumeStorage,
    job_id: Uuid,
    owner_id: Uuid,
) -> Result<(), AppError> {
    info!("Deleting job {job_id} by company {owner_id}");

    let mut tx = pool.begin().await?;

    let owned: Option<Uuid> =
        sqlx::query_scalar("SELECT id FROM jobs WHERE id = $1 AND created_by = $2 FOR UPDATE")
            .bind(job_id)
            .bind(owner_id)
            .fetch_optional(&mut *tx)
            .await?;
    if owned.is_none() {
        return Err(AppError::Forbidden(NOT_OWNER.to_string()));
    }

    let resume_links: Vec<String> =
        sqlx::query_scalar("SELECT resume_link FROM applications WHERE job_id = $1")
            .bind(job_id)
            .fetch_all(&mut *tx)
            .await?;

    sqlx::query("DELETE FROM jobs WHERE id = $1")
        .bind(job_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    info!(
        "Job {job_id} deleted with {} application(s)",
        resume_links.len()
    );
    resumes.delete_detached(resume_links);
    Ok(())
}

pub async fn get_job(pool: &PgPool, job_id: Uuid) -> Result<JobRow, AppError> {
    fetch_job(pool, job_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))
}

/// Public browse over every job, AND-combining the provided filters.
pub async fn search_jobs(
    pool: &PgPool,
    filters: &JobFilters,
    page: &PageRequest,
) -> Result<Page<JobRow>, AppError> {
    info!(
        "Searching jobs: title={:?} location={:?} company={:?}",
        filters.title, filters.location, filters.company_name
    );
    let sort = SEARCH_SORT.resolve(page)?;

    let title = contains_pattern(filters.title.as_deref());
    let location = contains_pattern(filters.location.as_deref());
    let company = contains_pattern(filters.company_name.as_deref());

    const FROM_WHERE: &str = r#"
        FROM jobs j
        JOIN users u ON u.id = j.created_by
        WHERE ($1::text IS NULL OR j.title ILIKE $1)
          AND ($2::text IS NULL OR j.location ILIKE $2)
          AND ($3::text IS NULL OR u.name ILIKE $3)
    "#;

    let rows: Vec<JobRow> = sqlx::query_as(&format!(
        "SELECT {JOB_COLUMNS} {FROM_WHERE} ORDER BY {} LIMIT $4 OFFSET $5",
        sort.to_sql("j.id")
    ))
    .bind(&title)
    .bind(&location)
    .bind(&company)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) {FROM_WHERE}"))
        .bind(&title)
        .bind(&location)
        .bind(&company)
        .fetch_one(pool)
        .await?;

    Ok(Page::new(rows, page, total))
}

/// The owner's postings, each with its live application count.
pub async fn list_owner_jobs(
    pool: &PgPool,
    owner_id: Uuid,
    status: Option<JobStatus>,
    page: &PageRequest,
) -> Result<Page<OwnedJobRow>, AppError> {
    info!("Listing jobs of company {owner_id} (status {status:?})");
    let sort = OWNER_SORT.resolve(page)?;

    let rows: Vec<OwnedJobRow> = sqlx::query_as(&format!(
        r#"
        SELECT {JOB_COLUMNS},
               (SELECT COUNT(*) FROM applications a WHERE a.job_id = j.id) AS application_count
        FROM jobs j
        JOIN users u ON u.id = j.created_by
        WHERE j.created_by = $1
          AND ($2::job_status IS NULL OR j.status = $2)
        ORDER BY {}
        LIMIT $3 OFFSET $4
        "#,
        sort.to_sql("j.id")
    ))
    .bind(owner_id)
    .bind(status)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM jobs WHERE created_by = $1 AND ($2::job_status IS NULL OR status = $2)",
    )
    .bind(owner_id)
    .bind(status)
    .fetch_one(pool)
    .await?;

    Ok(Page::new(rows, page, total))
}
