// libs/appointment-cell/src/store.rs
use tracing::debug;

use crate::models::{
    Appointment, AppointmentPage, AppointmentPatch, RawAppointmentRecord, StatusTab,
};

/// Dashboard page size.
pub const PAGE_SIZE: usize = 5;

/// Working set of one doctor's appointment requests. Constructed once per
/// dashboard session and handed to the transition engine; there is no
/// ambient global state.
///
/// The store applies optimistic patches and rollbacks by id and computes tab
/// selections and pages from the in-memory snapshot. It does no validation
/// and no I/O of its own.
pub struct AppointmentStore {
    doctor_name: String,
    appointments: Vec<Appointment>,
}

impl AppointmentStore {
    pub fn new(doctor_name: impl Into<String>) -> Self {
        Self {
            doctor_name: doctor_name.into(),
            appointments: Vec::new(),
        }
    }

    pub fn doctor_name(&self) -> &str {
        &self.doctor_name
    }

    /// Replace the working set with the given raw records: keep those whose
    /// doctor matches this session's doctor (case-insensitive exact match),
    /// normalise statuses, newest (highest id) first. Returns the number of
    /// records kept. Fetch failures are the caller's concern; if the fetch
    /// failed, this is never called and the prior set stays in place.
    pub fn load(&mut self, records: Vec<RawAppointmentRecord>) -> usize {
        let doctor = self.doctor_name.trim();

        let mut loaded: Vec<Appointment> = records
            .into_iter()
            .filter(|record| record.doctor_name.trim().eq_ignore_ascii_case(doctor))
            .map(Appointment::from_raw)
            .collect();
        loaded.sort_by(|a, b| b.id.cmp(&a.id));

        debug!("Loaded {} appointments for {}", loaded.len(), doctor);
        self.appointments = loaded;
        self.appointments.len()
    }

    pub fn get(&self, id: i64) -> Option<&Appointment> {
        self.appointments.iter().find(|a| a.id == id)
    }

    /// Owned copy of the current record, taken before a transition so the
    /// engine can roll back to it.
    pub fn snapshot(&self, id: i64) -> Option<Appointment> {
        self.get(id).cloned()
    }

    /// Merge a patch into the matching appointment and return the updated
    /// record. Pure merge; guards live in the transition engine.
    pub fn apply_optimistic(&mut self, id: i64, patch: &AppointmentPatch) -> Option<Appointment> {
        let appointment = self.appointments.iter_mut().find(|a| a.id == id)?;
        appointment.merge(patch);
        Some(appointment.clone())
    }

    /// Put a pre-transition snapshot back in place of the current record.
    pub fn restore(&mut self, snapshot: Appointment) {
        if let Some(appointment) = self.appointments.iter_mut().find(|a| a.id == snapshot.id) {
            *appointment = snapshot;
        }
    }

    pub fn select_by_status_tab(&self, tab: StatusTab) -> Vec<&Appointment> {
        self.appointments
            .iter()
            .filter(|a| tab.matches(&a.status))
            .collect()
    }

    /// Page through a tab's selection. Pages are 1-based and clamp into
    /// range; an empty selection yields a single empty page.
    pub fn page(&self, tab: StatusTab, page: usize) -> AppointmentPage {
        let selection = self.select_by_status_tab(tab);
        let total = selection.len();
        let total_pages = std::cmp::max(1, total.div_ceil(PAGE_SIZE));
        let page = page.clamp(1, total_pages);

        let start = (page - 1) * PAGE_SIZE;
        let appointments = selection
            .into_iter()
            .skip(start)
            .take(PAGE_SIZE)
            .cloned()
            .collect();

        AppointmentPage {
            appointments,
            page,
            page_size: PAGE_SIZE,
            total,
            total_pages,
        }
    }

    /// Drop an appointment from the working set. Local only; the remote
    /// record is not touched.
    pub fn remove(&mut self, id: i64) -> Option<Appointment> {
        let index = self.appointments.iter().position(|a| a.id == id)?;
        Some(self.appointments.remove(index))
    }

    pub fn len(&self) -> usize {
        self.appointments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.appointments.is_empty()
    }
}
