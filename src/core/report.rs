use crate::core::{AuditStatus, AuditedLead, BoundingBox, ScoutReport};
use crate::utils::error::{Result, ScoutError};
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const LEADS_CSV: &str = "leads.csv";
pub const APPROVED_JSON: &str = "approved.json";
pub const REJECTED_JSON: &str = "rejected.json";
pub const ZONE_JSON: &str = "zone.json";

const CSV_HEADER: [&str; 10] = [
    "status",
    "name",
    "address",
    "phone",
    "rating",
    "website",
    "maps_url",
    "social_platform",
    "social_url",
    "reason",
];

/// 依稽核結果分類
pub fn build_report(
    zone: BoundingBox,
    query: &str,
    criteria: &str,
    leads: Vec<AuditedLead>,
) -> ScoutReport {
    let mut approved = Vec::new();
    let mut rejected = Vec::new();
    let mut errored = Vec::new();

    for lead in leads {
        match lead.verdict.status {
            AuditStatus::Approved => approved.push(lead),
            AuditStatus::Rejected => rejected.push(lead),
            AuditStatus::Error => errored.push(lead),
        }
    }

    ScoutReport {
        zone,
        query: query.to_string(),
        criteria: criteria.to_string(),
        generated_at: chrono::Utc::now(),
        approved,
        rejected,
        errored,
    }
}

pub fn leads_csv(report: &ScoutReport) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    for lead in report.all_leads() {
        let place = &lead.place;
        let rating = place.rating_label();
        writer.write_record([
            lead.verdict.status.as_str(),
            place.name(),
            place.address(),
            place.phone(),
            rating.as_str(),
            place.website_uri.as_deref().unwrap_or(""),
            place.google_maps_uri.as_deref().unwrap_or(""),
            lead.social.platform.as_str(),
            lead.social.url.as_str(),
            lead.verdict.reason.as_str(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| ScoutError::ProcessingError {
        message: format!("Failed to flush CSV writer: {}", e),
    })?;
    String::from_utf8(bytes).map_err(|e| ScoutError::ProcessingError {
        message: format!("CSV output is not UTF-8: {}", e),
    })
}

/// 報告 ZIP：leads.csv、approved.json、zone.json，以及有資料時的 rejected.json
pub fn report_archive(report: &ScoutReport) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

    zip.start_file::<_, ()>(LEADS_CSV, FileOptions::default())?;
    zip.write_all(leads_csv(report)?.as_bytes())?;

    zip.start_file::<_, ()>(APPROVED_JSON, FileOptions::default())?;
    zip.write_all(serde_json::to_string_pretty(&report.approved)?.as_bytes())?;

    if !report.rejected.is_empty() {
        zip.start_file::<_, ()>(REJECTED_JSON, FileOptions::default())?;
        zip.write_all(serde_json::to_string_pretty(&report.rejected)?.as_bytes())?;
    }

    zip.start_file::<_, ()>(ZONE_JSON, FileOptions::default())?;
    let zone = serde_json::json!({
        "zone": report.zone,
        "center": {"lat": report.zone.center().0, "lng": report.zone.center().1},
        "query": report.query,
        "criteria": report.criteria,
        "generated_at": report.generated_at,
        "qualified": report.approved.len(),
        "rejected": report.rejected.len(),
        "errored": report.errored.len(),
    });
    zip.write_all(serde_json::to_string_pretty(&zone)?.as_bytes())?;

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::social::social_link;
    use crate::core::{Place, Verdict};
    use std::io::Read;

    fn lead(name: &str, verdict: Verdict) -> AuditedLead {
        let place: Place = serde_json::from_value(serde_json::json!({
            "displayName": {"text": name},
            "formattedAddress": "1 Main St, Springfield",
            "types": ["cafe"],
            "rating": 4.2
        }))
        .unwrap();
        let social = social_link(place.name(), &place.types);
        AuditedLead {
            place,
            verdict,
            social,
        }
    }

    fn sample_report(with_rejected: bool) -> ScoutReport {
        let mut leads = vec![
            lead("Bean There", Verdict::approved("Independent cafe")),
            lead("Broken Cup", Verdict::error("AI Timeout")),
        ];
        if with_rejected {
            leads.push(lead("Starbucks", Verdict::rejected("Big chain")));
        }
        build_report(
            BoundingBox::new(34.13, 34.07, -118.38, -118.44),
            "Coffee Shop",
            "No chains",
            leads,
        )
    }

    fn archive_names(bytes: Vec<u8>) -> Vec<String> {
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
        let mut names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_build_report_partitions_by_status() {
        let report = sample_report(true);
        assert_eq!(report.approved.len(), 1);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.errored.len(), 1);
        assert_eq!(report.total(), 3);
        assert_eq!(report.approved[0].name(), "Bean There");
    }

    #[test]
    fn test_leads_csv_rows() {
        let csv = leads_csv(&sample_report(true)).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0],
            "status,name,address,phone,rating,website,maps_url,social_platform,social_url,reason"
        );
        assert!(lines[1].starts_with("APPROVED,Bean There,\"1 Main St, Springfield\",Not listed,4.2,"));
        assert!(lines[2].starts_with("REJECTED,Starbucks,"));
        assert!(lines[3].ends_with(",AI Timeout"));
    }

    #[test]
    fn test_archive_skips_empty_rejected() {
        let names = archive_names(report_archive(&sample_report(false)).unwrap());
        assert_eq!(names, vec![APPROVED_JSON, LEADS_CSV, ZONE_JSON]);

        let names = archive_names(report_archive(&sample_report(true)).unwrap());
        assert_eq!(names, vec![APPROVED_JSON, LEADS_CSV, REJECTED_JSON, ZONE_JSON]);
    }

    #[test]
    fn test_zone_json_contents() {
        let bytes = report_archive(&sample_report(true)).unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
        let mut content = String::new();
        archive
            .by_name(ZONE_JSON)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();

        let zone: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(zone["qualified"], 1);
        assert_eq!(zone["rejected"], 1);
        assert_eq!(zone["query"], "Coffee Shop");
        assert_eq!(zone["zone"]["north"], 34.13);
    }
}
