use aula_client_core::ids::{AssignmentId, CourseId, PaymentId, SubjectId, UserId};
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;

#[derive(Parser, Debug)]
#[command(name = "aula", version, about = "Cliente del instituto: pagos, cursadas y gestión académica")]
pub struct Cli {
    /// Backend base URL (overrides AULA_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in and remember the session
    Login {
        username: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Create a student account
    Signup {
        username: String,
        #[arg(long)]
        password: Option<String>,
    },
    Logout,
    /// Show the logged-in user and the screens available to them
    Whoami,
    /// Landing screen for the current role
    Dashboard,
    MyPayments,
    MyCourse,
    Profile,
    ChangePassword {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
        #[arg(long)]
        confirm: String,
    },
    /// Subjects, courses and course-subject assignments
    #[command(subcommand)]
    Academic(AcademicCommand),
    /// Enroll a student in a course
    Enroll {
        #[arg(long)]
        student: UserId,
        #[arg(long)]
        course: CourseId,
    },
    #[command(subcommand)]
    Payments(PaymentsCommand),
    #[command(subcommand)]
    Users(UsersCommand),
}

#[derive(Subcommand, Debug)]
pub enum AcademicCommand {
    Show,
    AddSubject { name: String },
    DeleteSubject { id: SubjectId },
    AddCourse {
        name: String,
        #[arg(long)]
        status: Option<String>,
    },
    DeleteCourse { id: CourseId },
    Assign {
        #[arg(long)]
        course: CourseId,
        #[arg(long)]
        subject: SubjectId,
    },
    Unassign { id: AssignmentId },
}

#[derive(Subcommand, Debug)]
pub enum PaymentsCommand {
    Show {
        /// Only students whose name contains this text
        #[arg(long, default_value = "")]
        filter: String,
    },
    Add {
        #[arg(long)]
        student: UserId,
        #[arg(long)]
        course: CourseId,
        #[arg(long)]
        amount: Decimal,
        /// Month covered, as YYYY-MM
        #[arg(long)]
        month: String,
    },
    Delete { id: PaymentId },
}

#[derive(Subcommand, Debug)]
pub enum UsersCommand {
    List {
        #[arg(long)]
        students: bool,
    },
    Add(UserArgs),
    Update {
        id: UserId,
        #[command(flatten)]
        user: UserArgs,
    },
    Delete { id: UserId },
}

#[derive(Args, Debug, Clone)]
pub struct UserArgs {
    #[arg(long)]
    pub username: String,
    /// Required when creating; left unchanged on update when omitted
    #[arg(long)]
    pub password: Option<String>,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub dni: i64,
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    /// Alumno, Administrador or any other backend type
    #[arg(long, default_value = "Alumno")]
    pub role: String,
}
