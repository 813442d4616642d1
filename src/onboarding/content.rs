//! Onboarding tutorial content, chosen from role and KPI mode alone.
//!
//! Everything here is pure: no I/O, no clock, no network. Each role has a
//! fixed sequence; managers and sellers get one adaptive KPI panel spliced in
//! at a fixed position. Every variant of that panel shares `KPI_STEP_ID`.

use crate::api::model::Role;
use crate::flow::Step;

use super::mode::KpiMode;

/// Id shared by every variant of the adaptive KPI panel.
pub const KPI_STEP_ID: &str = "kpi_tracking";

/// Index of the adaptive panel in the manager tour.
pub const MANAGER_KPI_POSITION: usize = 2;

/// Index of the adaptive panel in the seller tour.
pub const SELLER_KPI_POSITION: usize = 3;

/// Build the onboarding tour for `role` under `mode`.
pub fn build_steps(role: Role, mode: KpiMode) -> Vec<Step> {
    match role {
        Role::Manager => splice(manager_steps(), MANAGER_KPI_POSITION, manager_kpi_step(mode)),
        Role::Seller => splice(seller_steps(), SELLER_KPI_POSITION, seller_kpi_step(mode)),
        Role::SuperAdmin => super_admin_steps(),
        Role::ItAdmin => it_admin_steps(),
    }
}

/// Same as `build_steps`, taking the backend's raw mode code.
pub fn build_steps_for_code(role: Role, mode_code: Option<&str>) -> Vec<Step> {
    build_steps(role, mode_code.map(KpiMode::from_code).unwrap_or_default())
}

fn splice(mut steps: Vec<Step>, position: usize, step: Step) -> Vec<Step> {
    let position = position.min(steps.len());
    steps.insert(position, step);
    steps
}

fn manager_steps() -> Vec<Step> {
    vec![
        Step::panel(
            "manager_welcome",
            "Welcome to your coaching space",
            "Follow your team's performance and coach each seller where it matters.",
        )
        .with_icon("👋"),
        Step::panel(
            "manager_team",
            "Your team",
            "Invite your sellers. Each one takes a short diagnostic that maps their selling strengths.",
        )
        .with_icon("👥")
        .with_tip("Sellers get their invitation by email."),
        Step::panel(
            "manager_objectives",
            "Objectives",
            "Set monthly targets for the store and for each seller.",
        )
        .with_icon("🎯"),
        Step::panel(
            "manager_challenges",
            "Challenges",
            "Launch short team challenges to focus everyone on one behaviour at a time.",
        )
        .with_icon("🏆"),
        Step::panel(
            "manager_coaching",
            "Coaching briefs",
            "Before each one-to-one, get a brief built from the seller's diagnostic and recent figures.",
        )
        .with_icon("💬")
        .with_tip("Briefs refresh every morning."),
        Step::panel(
            "manager_done",
            "You're all set",
            "Your dashboard is ready. You can replay this tour from the settings page.",
        )
        .with_icon("✅"),
    ]
}

fn manager_kpi_step(mode: KpiMode) -> Step {
    let (prompt, tip) = match mode {
        KpiMode::ManagerEntry => (
            "Enter the store's daily figures (sales, tickets, footfall) from the KPI tab. \
             Your sellers' dashboards update as soon as you save.",
            "A reminder is sent each evening if today's figures are missing.",
        ),
        KpiMode::SellerEntry => (
            "Your sellers enter their own daily figures. You review and correct them from the KPI tab.",
            "You can switch to manager entry at any time in the settings.",
        ),
        KpiMode::ApiSync => (
            "Figures are synced automatically from your point-of-sale system. Nothing to type in.",
            "Sync problems are flagged on the KPI tab.",
        ),
    };
    Step::panel(KPI_STEP_ID, "Tracking your KPIs", prompt)
        .with_icon("📊")
        .with_tip(tip)
}

fn seller_steps() -> Vec<Step> {
    vec![
        Step::panel(
            "seller_welcome",
            "Welcome aboard",
            "This space helps you grow as a seller, one customer at a time.",
        )
        .with_icon("👋"),
        Step::panel(
            "seller_diagnostic",
            "Your diagnostic",
            "Your profile comes from the diagnostic you took. It highlights your strengths and what to work on.",
        )
        .with_icon("🧭"),
        Step::panel(
            "seller_daily_coach",
            "Daily coaching",
            "Every day you get one short tip tailored to your profile.",
        )
        .with_icon("💡"),
        Step::panel(
            "seller_challenges",
            "Challenges",
            "Take part in your team's challenges and track your progress.",
        )
        .with_icon("🏆"),
        Step::panel(
            "seller_done",
            "Ready to go",
            "Open your dashboard to see today's tip.",
        )
        .with_icon("✅"),
    ]
}

fn seller_kpi_step(mode: KpiMode) -> Step {
    let (prompt, tip) = match mode {
        KpiMode::ManagerEntry => (
            "Your manager enters the store's figures. You'll see your results on your dashboard every day.",
            None,
        ),
        KpiMode::SellerEntry => (
            "Enter your sales and number of tickets at the end of each day from the KPI tab.",
            Some("It takes less than a minute."),
        ),
        KpiMode::ApiSync => (
            "Your figures are imported automatically from the till. Check them on your dashboard.",
            None,
        ),
    };
    let step = Step::panel(KPI_STEP_ID, "Your figures", prompt).with_icon("📊");
    match tip {
        Some(tip) => step.with_tip(tip),
        None => step,
    }
}

fn super_admin_steps() -> Vec<Step> {
    vec![
        Step::panel(
            "admin_welcome",
            "Platform administration",
            "Manage workspaces, subscriptions and platform-wide settings.",
        )
        .with_icon("🛠"),
        Step::panel(
            "admin_workspaces",
            "Workspaces",
            "Each customer company is a workspace. Suspend, restore or inspect them from here.",
        ),
        Step::panel(
            "admin_done",
            "Audit trail",
            "Every administrative action is logged and visible in the audit tab.",
        ),
    ]
}

fn it_admin_steps() -> Vec<Step> {
    vec![
        Step::panel(
            "it_welcome",
            "IT administration",
            "Connect your company's systems to the platform.",
        )
        .with_icon("🔌"),
        Step::panel(
            "it_api_keys",
            "API keys",
            "Create keys for your point-of-sale integration. Keys are shown once.",
        )
        .with_tip("Rotate keys regularly."),
        Step::panel(
            "it_done",
            "Users and stores",
            "Provision stores and user accounts in bulk from the import tab.",
        ),
    ]
}
