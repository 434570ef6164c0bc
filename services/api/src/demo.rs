use std::sync::Arc;

use brgy_docs::error::AppError;
use brgy_docs::requests::{
    DocumentRequestSubmission, DocumentType, FeeSchedule, PageRequest, RequestFilter,
    RequestLifecycleService, RequestRecord,
};
use clap::Args;

use crate::infra::{InMemoryRequestStore, SeededResidentDirectory};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Print the full audit trail for each request after the walkthrough
    #[arg(long)]
    pub(crate) show_notes: bool,
}

/// Walk three sample requests through the counter flow: a free urgent
/// indigency certificate, a rejected clearance, and a business permit taken
/// all the way to release. Mirrors what the portal UI drives over HTTP.
pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let store = Arc::new(InMemoryRequestStore::default());
    let directory = Arc::new(SeededResidentDirectory::sample_roster());
    let service = RequestLifecycleService::new(store, directory, FeeSchedule::standard());

    println!("Barangay document request walkthrough");
    println!("=====================================");

    let indigency = service.submit(DocumentRequestSubmission {
        document_type: DocumentType::CertificateOfIndigency,
        resident_id: 7,
        purpose: "Medical Assistance".to_string(),
        is_urgent: true,
        requirements_submitted: vec!["Valid ID".to_string()],
    })?;
    print_receipt("Urgent indigency certificate (legally free)", &indigency);

    let clearance = service.submit(DocumentRequestSubmission {
        document_type: DocumentType::BarangayClearance,
        resident_id: 12,
        purpose: "Employment requirement".to_string(),
        is_urgent: false,
        requirements_submitted: vec!["Cedula".to_string()],
    })?;
    print_receipt("Barangay clearance", &clearance);
    let clearance = service.reject(clearance.id, "missing valid ID", None)?;
    println!("  -> rejected: {}", last_note(&clearance));

    let permit = service.submit(DocumentRequestSubmission {
        document_type: DocumentType::BusinessPermit,
        resident_id: 31,
        purpose: "Sari-sari store renewal".to_string(),
        is_urgent: true,
        requirements_submitted: vec!["DTI registration".to_string()],
    })?;
    print_receipt("Business permit (urgent, no rush surcharge)", &permit);
    service.advance_to_review(permit.id)?;
    service.approve(permit.id, "Hon. Reyes", Some("requirements complete"))?;
    let permit = service.release(permit.id, None)?;
    println!(
        "  -> released, certified by {}",
        permit
            .request
            .certifying_official
            .as_deref()
            .unwrap_or("(unset)")
    );

    println!();
    println!("Dashboard statistics");
    let stats = service.statistics(&RequestFilter::default())?;
    println!(
        "  total {} | pending {} | under review {} | approved {} | released {} | rejected {}",
        stats.total, stats.pending, stats.under_review, stats.approved, stats.released,
        stats.rejected
    );
    for (document_type, count) in &stats.by_document_type {
        println!("  {document_type}: {count}");
    }

    println!();
    let reference = permit.reference_number().to_string();
    match service.track(&reference) {
        Ok(view) => println!(
            "Tracking {}: {} ({})",
            view.reference_number, view.status, view.document_type
        ),
        Err(err) => println!("Tracking {reference}: {err}"),
    }

    if args.show_notes {
        println!();
        println!("Audit trails");
        let page = service.list(&RequestFilter::default(), PageRequest::default())?;
        for item in &page.items {
            let record = service.get(item.id)?;
            println!("  {} [{}]", item.reference_number, item.status);
            for note in &record.request.notes {
                match &note.actor {
                    Some(actor) => println!("    {} {} ({actor})", note.at, note.entry),
                    None => println!("    {} {}", note.at, note.entry),
                }
            }
        }
    }

    Ok(())
}

fn print_receipt(label: &str, record: &RequestRecord) {
    println!(
        "{label}\n  ref {} | fee {} | priority {} | status {}",
        record.reference_number(),
        record.request.processing_fee,
        record.request.priority,
        record.request.status
    );
}

fn last_note(record: &RequestRecord) -> &str {
    record
        .request
        .notes
        .last()
        .map(|note| note.entry.as_str())
        .unwrap_or("")
}
