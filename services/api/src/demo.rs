use crate::infra::HostelDesk;
use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::Args;
use hostel_ms::clock::FixedClock;
use hostel_ms::config::SequenceConfig;
use hostel_ms::error::AppError;
use hostel_ms::records::{
    AdmissionAction, Amenity, AmenityCategory, CalculationCategory, CleanType, Department,
    DepositPolicy, Employee, Gender, Hostel, HostelAction, HostelAdmission, HostelRoom,
    HousekeepingAction, HousekeepingRecord, InspectorRole, PaymentFrequency, PriceListPolicy,
    RecordId, RoomCondition, Student, StudentAction,
};
use hostel_ms::reports::{CsvStudentReportRenderer, StudentReportWizard};
use hostel_ms::store::SearchScope;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Override the reporting date (defaults to today).
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Earliest birth date included in the student report (defaults to today).
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) from_date: Option<NaiveDate>,
    /// Latest birth date included in the student report (defaults to today).
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) to_date: Option<NaiveDate>,
    /// First admission sequence value handed out during the demo.
    #[arg(long, default_value_t = 1)]
    pub(crate) sequence_start: u64,
}

struct DemoStudent {
    name: &'static str,
    father_name: &'static str,
    registration_no: &'static str,
    gender: Gender,
    born: (i32, u32, u32),
}

const DEMO_STUDENTS: [DemoStudent; 4] = [
    DemoStudent {
        name: "Hamza Ali",
        father_name: "Ali Raza",
        registration_no: "REG-001",
        gender: Gender::Male,
        born: (2000, 2, 14),
    },
    DemoStudent {
        name: "Sara Malik",
        father_name: "Imran Malik",
        registration_no: "REG-002",
        gender: Gender::Female,
        born: (2000, 11, 3),
    },
    DemoStudent {
        name: "Usman Tariq",
        father_name: "Tariq Mehmood",
        registration_no: "REG-003",
        gender: Gender::Male,
        born: (1999, 7, 21),
    },
    DemoStudent {
        name: "Ayesha Noor",
        father_name: "Noor Ahmed",
        registration_no: "REG-004",
        gender: Gender::Female,
        born: (2001, 1, 9),
    },
];

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        today,
        from_date,
        to_date,
        sequence_start,
    } = args;

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let desk = HostelDesk::in_memory(
        SequenceConfig {
            student_code_start: sequence_start.max(1),
        },
        Arc::new(FixedClock(today)),
    );

    println!("Hostel management demo (evaluated {today})");

    let department = desk.departments.create(Department {
        name: "Computer Science".to_string(),
    })?;
    println!("\nDepartment #{}: {}", department.id, department.record.name);

    let mut student_ids = Vec::new();
    println!("\nStudents");
    for entry in &DEMO_STUDENTS {
        let mut student = Student::new(
            entry.name,
            entry.father_name,
            entry.registration_no,
            entry.gender,
            today,
        );
        let (year, month, day) = entry.born;
        student.date_of_birth = NaiveDate::from_ymd_opt(year, month, day);
        student.department_id = Some(department.id);

        let stored = desk.students.create(student)?;
        println!(
            "- #{} {} ({}), age {}, status {}",
            stored.id,
            stored.record.name,
            stored.record.gender.label(),
            stored.record.age,
            stored.record.state.label()
        );
        student_ids.push(stored.id);
    }

    println!("\nStudent lifecycle");
    for (index, id) in student_ids.iter().enumerate() {
        desk.students.transition(*id, StudentAction::SetToVerified)?;
        let approved = desk.students.transition(*id, StudentAction::SetToApproved)?;
        println!(
            "- {} approved with admission no. {}",
            approved.record.name,
            approved.record.admission_no.as_deref().unwrap_or("-")
        );
        if index == student_ids.len() - 1 {
            let cancelled = desk.students.transition(*id, StudentAction::SetToCancelled)?;
            println!(
                "- {} cancelled (admission no. kept: {})",
                cancelled.record.name,
                cancelled.record.admission_no.as_deref().unwrap_or("-")
            );
        }
    }

    let (hostel_id, room_id) = seed_hostel(&desk, today)?;
    if let Some(first_student) = student_ids.first() {
        seed_admission(&desk, *first_student, hostel_id, room_id, today)?;
    }

    let employee = desk
        .employees
        .create(Employee::new("Nadia Farooq", "Farooq Ahmed", "EMP-001"))?;
    desk.employees.archive(employee.id)?;
    let visible = desk.employees.list(SearchScope::ActiveOnly)?.len();
    let stored = desk.employees.list(SearchScope::IncludeArchived)?.len();
    println!("\nEmployees: {visible} listed, {stored} stored (one archived)");

    let wizard = StudentReportWizard::with_bounds(from_date, to_date, today);
    let students = desk.students.repository().clone();
    let renderer = CsvStudentReportRenderer::new(students.clone(), desk.clock.clone());
    let report = wizard.print_report(students.as_ref(), &renderer)?;

    println!(
        "\nStudent report {} (born {} -> {}, {} match(es))",
        report.report_ref,
        wizard.from_date,
        wizard.to_date,
        report.record_ids.len()
    );
    print!("{}", report.body);

    Ok(())
}

fn seed_hostel(desk: &HostelDesk, today: NaiveDate) -> Result<(RecordId, RecordId), AppError> {
    let hostel = desk.hostels.create(Hostel::new(
        "Iqbal Hall",
        "Canal Road, Lahore",
        "120",
        today,
    ))?;
    let hostel = desk
        .hostels
        .transition(hostel.id, HostelAction::SetToApproved)?;
    println!(
        "\nHostel #{} {} is {}",
        hostel.id,
        hostel.record.name,
        hostel.record.state.label()
    );

    let room = desk.rooms.create(HostelRoom {
        name: "Ground floor double".to_string(),
        hostel_id: Some(hostel.id),
        room_number: "G-12".to_string(),
        no_of_rooms: "2".to_string(),
        no_of_floor: "1".to_string(),
        amenity_id: None,
        rent: 9500,
    })?;

    let amenity = desk.amenities.create(Amenity {
        name: "Study desk".to_string(),
        category_type: Some(AmenityCategory::Cheap),
        price: "4500".to_string(),
        date_of_purchase: Some(today),
        room_id: Some(room.id),
    })?;
    let mut furnished = room.record.clone();
    furnished.amenity_id = Some(amenity.id);
    let room = desk.rooms.update(room.id, furnished)?;
    println!(
        "- Room {} (rent {}) furnished with {}",
        room.record.room_number, room.record.rent, amenity.record.name
    );

    let inspection = desk.housekeeping.create(HousekeepingRecord {
        date: Some(at(today, 9)),
        room_id: Some(room.id),
        inspect_date: Some(at(today, 11)),
        clean_type: Some(CleanType::Weekly),
        inspector: Some(InspectorRole::Warden),
        condition: Some(RoomCondition::Good),
        active: true,
        state: Default::default(),
    })?;
    let inspection = desk
        .housekeeping
        .transition(inspection.id, HousekeepingAction::SetToVerified)?;
    println!("- Housekeeping inspection {:?}", inspection.record.state);

    Ok((hostel.id, room.id))
}

fn seed_admission(
    desk: &HostelDesk,
    student_id: RecordId,
    hostel_id: RecordId,
    room_id: RecordId,
    today: NaiveDate,
) -> Result<(), AppError> {
    let policy = desk.deposit_policies.create(DepositPolicy {
        name: "Semester deposit".to_string(),
        short_description: "Two months rent up front".to_string(),
        from_date: Some(at(today, 0)),
        end_date: Some(at(today + chrono::Duration::days(180), 0)),
        percentage: 20.0,
        minimum_deposit_amount: Some(19_000.0),
        calculation_category_type: Some(CalculationCategory::Monthly),
        taxes: 0,
        fixed_charges: false,
        bookable_packages: true,
        inactive: false,
        hostel_id: Some(hostel_id),
    })?;

    let mut admission = HostelAdmission::new(
        student_id,
        hostel_id,
        room_id,
        at(today, 10),
        at(today + chrono::Duration::days(300), 10),
    );
    admission.deposit_policy_id = Some(policy.id);
    admission.price_list_policy = Some(PriceListPolicy::Public);
    admission.payment_frequency = Some(PaymentFrequency::Monthly);

    let admission = desk.admissions.create(admission)?;
    desk.admissions
        .transition(admission.id, AdmissionAction::SetToVerified)?;
    let admission = desk
        .admissions
        .transition(admission.id, AdmissionAction::SetDone)?;
    println!(
        "- Admission {} for student #{} ({}) is {:?}",
        admission.record.name_seq,
        student_id,
        admission
            .record
            .price_list_policy
            .map(PriceListPolicy::label)
            .unwrap_or("no price list"),
        admission.record.state
    );
    Ok(())
}

fn at(day: NaiveDate, hour: u32) -> NaiveDateTime {
    day.and_hms_opt(hour, 0, 0).unwrap_or_else(|| day.and_time(Default::default()))
}
