use chrono::NaiveDate;
use hostel_ms::clock::Clock;
use hostel_ms::config::SequenceConfig;
use hostel_ms::records::{
    Amenity, Department, DepositPolicy, Employee, Hostel, HostelAdmission, HostelRoom,
    HousekeepingRecord, Record, Student,
};
use hostel_ms::relations::Relations;
use hostel_ms::sequence::InMemorySequence;
use hostel_ms::service::RecordService;
use hostel_ms::store::InMemoryRepository;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type MemoryService<T> = RecordService<T, InMemoryRepository<T>, InMemorySequence>;

/// Every record service, wired to in-memory storage and one shared set of counters.
#[derive(Clone)]
pub(crate) struct HostelDesk {
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) sequences: Arc<InMemorySequence>,
    pub(crate) departments: Arc<MemoryService<Department>>,
    pub(crate) students: Arc<MemoryService<Student>>,
    pub(crate) employees: Arc<MemoryService<Employee>>,
    pub(crate) hostels: Arc<MemoryService<Hostel>>,
    pub(crate) rooms: Arc<MemoryService<HostelRoom>>,
    pub(crate) amenities: Arc<MemoryService<Amenity>>,
    pub(crate) housekeeping: Arc<MemoryService<HousekeepingRecord>>,
    pub(crate) deposit_policies: Arc<MemoryService<DepositPolicy>>,
    pub(crate) admissions: Arc<MemoryService<HostelAdmission>>,
}

impl HostelDesk {
    pub(crate) fn in_memory(config: SequenceConfig, clock: Arc<dyn Clock>) -> Self {
        let sequences = Arc::new(InMemorySequence::starting_at(config.student_code_start));

        let departments = Arc::new(InMemoryRepository::<Department>::default());
        let students = Arc::new(InMemoryRepository::<Student>::default());
        let employees = Arc::new(InMemoryRepository::<Employee>::default());
        let hostels = Arc::new(InMemoryRepository::<Hostel>::default());
        let rooms = Arc::new(InMemoryRepository::<HostelRoom>::default());
        let amenities = Arc::new(InMemoryRepository::<Amenity>::default());
        let housekeeping = Arc::new(InMemoryRepository::<HousekeepingRecord>::default());
        let deposit_policies = Arc::new(InMemoryRepository::<DepositPolicy>::default());
        let admissions = Arc::new(InMemoryRepository::<HostelAdmission>::default());

        let mut relations = Relations::default();
        relations.register::<Department, _>(departments.clone());
        relations.register::<Student, _>(students.clone());
        relations.register::<Employee, _>(employees.clone());
        relations.register::<Hostel, _>(hostels.clone());
        relations.register::<HostelRoom, _>(rooms.clone());
        relations.register::<Amenity, _>(amenities.clone());
        relations.register::<HousekeepingRecord, _>(housekeeping.clone());
        relations.register::<DepositPolicy, _>(deposit_policies.clone());
        relations.register::<HostelAdmission, _>(admissions.clone());
        let wiring = Wiring {
            sequences: &sequences,
            clock: &clock,
            relations: Arc::new(relations),
        };

        Self {
            departments: wiring.service(departments),
            students: wiring.service(students),
            employees: wiring.service(employees),
            hostels: wiring.service(hostels),
            rooms: wiring.service(rooms),
            amenities: wiring.service(amenities),
            housekeeping: wiring.service(housekeeping),
            deposit_policies: wiring.service(deposit_policies),
            admissions: wiring.service(admissions),
            clock,
            sequences,
        }
    }
}

struct Wiring<'a> {
    sequences: &'a Arc<InMemorySequence>,
    clock: &'a Arc<dyn Clock>,
    relations: Arc<Relations>,
}

impl Wiring<'_> {
    fn service<T: Record>(
        &self,
        repository: Arc<InMemoryRepository<T>>,
    ) -> Arc<MemoryService<T>> {
        Arc::new(
            RecordService::new(repository, self.sequences.clone(), self.clock.clone())
                .with_relations(self.relations.clone()),
        )
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.map(|value| parse_date(&value).map_err(serde::de::Error::custom))
        .transpose()
}
