//! User-facing wording of the assistant. Amounts render as whole rupees with thousands
//! separators.

use loanline_core::documents::{DocumentError, SanctionArtifact};
use loanline_core::domain::customer::CustomerProfile;
use loanline_core::domain::loan::{LoanDetails, LoanRequest};
use loanline_core::domain::session::QuickReply;
use loanline_core::underwriting::{Decision, Rejection};

use crate::confirmation::ConfirmationPrompt;

pub fn format_rupees(amount: f64) -> String {
    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    format!("{sign}₹{grouped}")
}

pub fn format_tenure(tenure_months: u32) -> String {
    format!("{tenure_months} months ({} years {} months)", tenure_months / 12, tenure_months % 12)
}

pub fn greeting(profile: Option<&CustomerProfile>, has_offers: bool) -> String {
    let name = profile.map(CustomerProfile::first_name).unwrap_or("there");
    let offers = if has_offers {
        "I can see you have some exclusive pre-approved offers! Would you like to explore them?"
    } else {
        "Tell me how much you would like to borrow and over how many months."
    };
    format!(
        "Hello {name}!\n\nWelcome to Loanline Personal Loans. I'm here to help you get a personal \
         loan quickly and easily.\n\n{offers}"
    )
}

/// Asks for whichever loan detail is still missing.
pub fn requirements_prompt(request: &LoanRequest, profile: Option<&CustomerProfile>) -> String {
    match (request.amount, request.tenure_months) {
        (Some(amount), None) => format!(
            "Great! {} noted. What tenure would you prefer? We offer flexible tenures from 12 to \
             60 months.",
            format_rupees(amount)
        ),
        (None, Some(tenure)) => {
            format!("{tenure} months works. How much would you like to borrow?")
        }
        _ => {
            let limit = profile
                .and_then(|profile| profile.pre_approved_limit)
                .map(|limit| format!("You're pre-approved for up to {}. ", format_rupees(limit)))
                .unwrap_or_default();
            format!(
                "{limit}Could you please tell me:\n1. The loan amount you need (e.g., ₹2 lakhs)\n\
                 2. Your preferred repayment tenure in months (e.g., 24 months)"
            )
        }
    }
}

pub fn requirements_summary(request: &LoanRequest) -> String {
    let amount = request.amount.map(format_rupees).unwrap_or_default();
    let tenure = request.tenure_months.unwrap_or_default();
    format!(
        "Perfect! Let me summarize your loan request:\n\n**Loan Amount:** {amount}\n\
         **Tenure:** {tenure} months\n\nShall I proceed with verifying your details and \
         processing your application?"
    )
}

pub fn change_details() -> String {
    "No problem! What would you like to change? The loan amount or tenure?".to_string()
}

pub fn correction_requested() -> String {
    "Let me know what needs to be corrected.".to_string()
}

pub fn unclear_answer(prompt: ConfirmationPrompt) -> String {
    let options = match prompt {
        ConfirmationPrompt::Verification => "proceed with verification or change the details",
        ConfirmationPrompt::Underwriting => "confirm your details or update them",
        ConfirmationPrompt::Sanction => "generate the sanction letter now or receive it by email",
    };
    format!("Sorry, I didn't catch that. Would you like to {options}?")
}

pub fn missing_customer_id() -> String {
    "I need your customer ID to proceed. Could you please provide it?".to_string()
}

pub fn customer_not_found() -> String {
    "We couldn't find your details. Please contact our customer support.".to_string()
}

pub fn incomplete_profile() -> String {
    "Your profile is incomplete. Pre-approved limit not found. Please contact support.".to_string()
}

pub fn verification_unavailable() -> String {
    "Our verification service is temporarily unavailable. Please send any message to try again."
        .to_string()
}

pub fn kyc_mismatch(fields: &[&str]) -> String {
    format!(
        "Verification failed: the {} you shared does not match our records. Please check the \
         details and try again.",
        fields.join(" and ")
    )
}

pub fn verified_profile(profile: &CustomerProfile) -> String {
    let limit = profile.pre_approved_limit.map(format_rupees).unwrap_or_else(|| "N/A".to_string());
    format!(
        "Identity verified! Welcome back, {}.\n\n**Customer ID:** {}\n**Email:** {}\n\
         **Phone:** {}\n**City:** {}\n**Credit Score:** {}\n**Pre-approved Limit:** {limit}\n\n\
         Are these details correct? Shall I proceed with the loan assessment?",
        profile.name,
        profile.customer_id,
        profile.email,
        profile.phone,
        profile.city,
        profile.credit_score,
    )
}

pub fn missing_loan_details() -> String {
    "Missing loan details. Please tell me the loan amount and tenure you need.".to_string()
}

pub fn verification_incomplete() -> String {
    "Customer verification incomplete. Let me verify your details first. Send any message to \
     continue."
        .to_string()
}

pub fn assessment_unavailable() -> String {
    "I'm unable to fetch your credit information right now. Please send any message to try again."
        .to_string()
}

pub fn salary_received(salary: f64) -> String {
    format!(
        "Thank you! Monthly salary of {} received. Re-assessing your application.",
        format_rupees(salary)
    )
}

pub fn salary_reminder() -> String {
    "We still need your income details to continue. Please upload your latest salary slip, or \
     tell me a different loan amount."
        .to_string()
}

/// Explains an underwriting decision. Approvals end with the sanction letter question.
pub fn decision_message(decision: &Decision, interest_rate: f64, estimated_emi: f64) -> String {
    match decision {
        Decision::InstantApproval { loan } => format!(
            "Congratulations! Your loan is APPROVED!\n\n{}\n\n**Instant Approval** - no additional \
             documentation required.\n\nWould you like me to generate your official sanction \
             letter now?",
            loan_summary(loan)
        ),
        Decision::ConditionalApproval { loan, emi_to_salary_ratio } => format!(
            "Congratulations! Your loan is APPROVED!\n\n{}\n**EMI/Salary Ratio:** {:.1}%\n\n\
             **Income Verified & Approved**\n\nWould you like me to generate your official \
             sanction letter now?",
            loan_summary(loan),
            emi_to_salary_ratio * 100.0
        ),
        Decision::PendingSalarySlip { requested_amount, pre_approved_limit, .. } => format!(
            "Additional verification required.\n\nGood news! You're eligible for a loan of {}. \
             However, since this amount exceeds your instant approval limit of {}, we need to \
             verify your income.\n\nPlease provide your latest salary slip or bank statement.\n\n\
             Estimated EMI: {}/month\nInterest Rate: {interest_rate}% p.a.",
            format_rupees(*requested_amount),
            format_rupees(*pre_approved_limit),
            format_rupees(estimated_emi),
        ),
        Decision::Rejected(rejection) => rejection_guidance(rejection),
    }
}

fn loan_summary(loan: &LoanDetails) -> String {
    format!(
        "**Principal Amount:** {}\n**Tenure:** {}\n**Interest Rate:** {}% per annum\n\
         **Monthly EMI:** {}\n**Total Interest:** {}\n**Total Payable:** {}\n\
         **Credit Score:** {}/900",
        format_rupees(loan.loan_amount),
        format_tenure(loan.tenure_months),
        loan.interest_rate,
        format_rupees(loan.monthly_emi),
        format_rupees(loan.total_interest),
        format_rupees(loan.total_payment),
        loan.credit_score,
    )
}

pub fn rejection_guidance(rejection: &Rejection) -> String {
    match rejection {
        Rejection::CreditScore { credit_score, min_credit_score } => format!(
            "Unfortunately, we cannot approve your loan application at this time.\n\nReason: your \
             current credit score ({credit_score}/900) is below our minimum requirement of \
             {min_credit_score}.\n\nHow to improve:\n- Make timely payments on existing loans\n\
             - Maintain low credit card balances\n- Avoid multiple loan inquiries\n\nYou're \
             welcome to reapply after 6 months once your credit score improves."
        ),
        Rejection::EmiRatio {
            monthly_emi,
            salary,
            emi_to_salary_ratio,
            max_emi_ratio,
            pre_approved_limit,
        } => format!(
            "Thank you for providing your salary details. However, the EMI of {} would be {:.1}% \
             of your monthly salary ({}).\n\nOur policy limits EMI to {:.0}% of monthly income \
             for responsible lending.\n\nAlternative options:\n- Apply for {} (instant \
             approval)\n- Choose a longer tenure to reduce the EMI\n- Consider a co-applicant to \
             increase eligibility",
            format_rupees(*monthly_emi),
            emi_to_salary_ratio * 100.0,
            format_rupees(*salary),
            max_emi_ratio * 100.0,
            format_rupees(*pre_approved_limit),
        ),
        Rejection::HighAmount { requested_amount, pre_approved_limit, max_eligible_amount } => {
            format!(
                "The requested amount of {} exceeds your maximum eligible limit of {}.\n\nYour \
                 current eligibility:\n- Instant Approval: up to {}\n- With Income \
                 Verification: up to {}\n\nWould you like to proceed with a lower amount?",
                format_rupees(*requested_amount),
                format_rupees(*max_eligible_amount),
                format_rupees(*pre_approved_limit),
                format_rupees(*max_eligible_amount),
            )
        }
    }
}

pub fn sanction_issued(artifact: &SanctionArtifact, loan: &LoanDetails) -> String {
    format!(
        "Your sanction letter is ready!\n\n**Reference Number:** {}\n**Loan Account Number:** {}\n\
         **Sanctioned Amount:** {}\n**Monthly EMI:** {}\n\nYou can download it now. Thank you \
         for choosing Loanline!",
        artifact.reference_number,
        artifact.loan_account_number,
        format_rupees(loan.loan_amount),
        format_rupees(loan.monthly_emi),
    )
}

pub fn sanction_failed(error: &DocumentError) -> String {
    format!(
        "We could not generate your sanction letter: {error}. Your approval stands and our team \
         will share the letter with you separately."
    )
}

pub fn email_promise(profile: Option<&CustomerProfile>) -> String {
    let email = profile
        .map(|profile| profile.email.as_str())
        .filter(|email| !email.is_empty())
        .unwrap_or("your registered email");
    format!(
        "Perfect! We'll send your sanction letter to **{email}** within 24 hours.\n\nYou'll also \
         receive:\n- Loan agreement documents\n- Repayment schedule\n- Next steps for \
         documentation\n\nThank you for choosing Loanline!"
    )
}

pub fn conversation_closed() -> String {
    "This application is complete. Please start a new conversation if you need anything else."
        .to_string()
}

pub fn quick_replies(prompt: ConfirmationPrompt) -> Vec<QuickReply> {
    match prompt {
        ConfirmationPrompt::Verification => vec![
            QuickReply::new("Yes, Proceed", "proceed_verification"),
            QuickReply::new("Change Details", "change_details"),
        ],
        ConfirmationPrompt::Underwriting => vec![
            QuickReply::new("Yes, All Correct", "proceed_underwriting"),
            QuickReply::new("Update Details", "update_details"),
        ],
        ConfirmationPrompt::Sanction => vec![
            QuickReply::new("Generate Sanction Letter", "generate_sanction"),
            QuickReply::new("Email Me Later", "email_later"),
        ],
    }
}

#[cfg(test)]
mod tests {
    use loanline_core::domain::loan::LoanRequest;
    use loanline_core::underwriting::Rejection;

    use super::{
        format_rupees, format_tenure, quick_replies, rejection_guidance, requirements_prompt,
        requirements_summary,
    };
    use crate::confirmation::ConfirmationPrompt;

    #[test]
    fn rupees_are_grouped_in_thousands() {
        assert_eq!(format_rupees(0.0), "₹0");
        assert_eq!(format_rupees(999.4), "₹999");
        assert_eq!(format_rupees(4407.43), "₹4,407");
        assert_eq!(format_rupees(200_000.0), "₹200,000");
        assert_eq!(format_rupees(10_000_000.0), "₹10,000,000");
        assert_eq!(format_rupees(-1500.0), "-₹1,500");
    }

    #[test]
    fn tenure_shows_years_and_months() {
        assert_eq!(format_tenure(30), "30 months (2 years 6 months)");
    }

    #[test]
    fn prompt_asks_for_the_missing_field() {
        let amount_only = LoanRequest { amount: Some(200_000.0), tenure_months: None };
        assert!(requirements_prompt(&amount_only, None).contains("What tenure"));

        let tenure_only = LoanRequest { amount: None, tenure_months: Some(24) };
        assert!(requirements_prompt(&tenure_only, None).contains("How much"));

        let summary =
            requirements_summary(&LoanRequest { amount: Some(50_000.0), tenure_months: Some(12) });
        assert!(summary.contains("₹50,000"));
        assert!(summary.contains("12 months"));
    }

    #[test]
    fn high_amount_guidance_names_both_ceilings() {
        let message = rejection_guidance(&Rejection::HighAmount {
            requested_amount: 250_000.0,
            pre_approved_limit: 100_000.0,
            max_eligible_amount: 200_000.0,
        });
        assert!(message.contains("Instant Approval: up to ₹100,000"));
        assert!(message.contains("With Income Verification: up to ₹200,000"));
    }

    #[test]
    fn emi_ratio_guidance_states_ratio_and_instant_amount() {
        let message = rejection_guidance(&Rejection::EmiRatio {
            monthly_emi: 7_026.05,
            salary: 11_710.0,
            emi_to_salary_ratio: 0.6,
            max_emi_ratio: 0.5,
            pre_approved_limit: 100_000.0,
        });
        assert!(message.contains("60.0%"));
        assert!(message.contains("limits EMI to 50%"));
        assert!(message.contains("Apply for ₹100,000"));
    }

    #[test]
    fn every_prompt_offers_two_choices() {
        for prompt in [
            ConfirmationPrompt::Verification,
            ConfirmationPrompt::Underwriting,
            ConfirmationPrompt::Sanction,
        ] {
            assert_eq!(quick_replies(prompt).len(), 2);
        }
    }
}
