use super::Email;
use crate::models::application::ApplicationStatus;

const SIGNATURE: &str = "Best regards,\nThe Job Board Team";

pub fn verification(to: &str, name: &str, link: &str) -> Email {
    Email {
        to: to.to_string(),
        to_name: name.to_string(),
        subject: "Verify Your Email".to_string(),
        body: format!(
            "Dear {name},\n\n\
             Thank you for signing up. To complete your registration and activate your account, \
             please open the verification link below:\n\n\
             {link}\n\n\
             This link will expire in 1 hour for security purposes.\n\n\
             If you didn't create this account, please ignore this email.\n\n\
             {SIGNATURE}\n"
        ),
    }
}

pub fn new_application(
    company_email: &str,
    company_name: &str,
    job_title: &str,
    applicant_name: &str,
    base_url: &str,
) -> Email {
    Email {
        to: company_email.to_string(),
        to_name: company_name.to_string(),
        subject: format!("New Job Application Received - {job_title}"),
        body: format!(
            "Dear {company_name},\n\n\
             You have received a new job application for the position: {job_title}\n\n\
             Applicant: {applicant_name}\n\n\
             Please log in to your dashboard to review the application and manage your candidates.\n\n\
             Dashboard: {base_url}/dashboard\n\n\
             {SIGNATURE}\n"
        ),
    }
}

pub fn status_update(
    applicant_email: &str,
    applicant_name: &str,
    job_title: &str,
    company_name: &str,
    status: ApplicationStatus,
    base_url: &str,
) -> Email {
    let status_message = match status {
        ApplicationStatus::Interview => format!(
            "Congratulations! You've been selected for an interview for the position of \
             {job_title} at {company_name}.\n\n\
             The hiring team will contact you soon with interview details.\n\n\
             Good luck with your interview!"
        ),
        ApplicationStatus::Rejected => format!(
            "We regret to inform you that your application for the position of {job_title} \
             at {company_name} was not selected for the next stage of the hiring process.\n\n\
             We appreciate the time you took to apply and encourage you to apply for other \
             opportunities that match your skills and experience."
        ),
        ApplicationStatus::Hired => format!(
            "Congratulations! You have been selected for the position of {job_title} at \
             {company_name}.\n\n\
             The team will contact you soon with onboarding details and next steps."
        ),
        other => format!(
            "Your application status for the position of {job_title} at {company_name} \
             has been updated to: {other}\n\n\
             Please log in to your dashboard for more details."
        ),
    };

    Email {
        to: applicant_email.to_string(),
        to_name: applicant_name.to_string(),
        subject: format!("Application Status Update - {job_title}"),
        body: format!(
            "Dear {applicant_name},\n\n{status_message}\n\nDashboard: {base_url}/dashboard\n\n{SIGNATURE}\n"
        ),
    }
}
