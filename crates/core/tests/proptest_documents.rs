use chrono::{Days, NaiveDate, TimeZone, Utc};
use clinrag_core::{
    export, filter_by_diagnosis, filter_by_symptom, import, ingest, ingest_parallel,
    ClinicalRecord, DocumentFormatter, ExportFormat, Gender, LabValues, Outcome, RecordInput,
    VisitType, VitalSigns,
};
use proptest::prelude::*;
use proptest::test_runner::Config;

const WORDS: &[&str] = &[
    "Chest", "pain", "Diabetes", "type", "Hypertension", "acute", "chronic", "Migraine",
    "shortness", "of", "breath", "Fever", "Asthma", "follow-up", "Cardiology", "Neurology",
    "severe", "mild", "Anxiety", "sleep", "apnea",
];

const NOTE_PIECES: &[&str] = &[
    "Patient", "presents", "with", "pain", "for", "3", "days.", "BP:", "150/95", "\"stable\"",
    "#note", "- item", "\n", "Recommend", "follow-up;", "dose: 5 mg", "é",
];

fn phrase() -> impl Strategy<Value = String> {
    (
        prop::sample::select(&WORDS[..3]),
        prop::collection::vec(prop::sample::select(WORDS), 0..4),
    )
        .prop_map(|(head, tail)| {
            let mut words = vec![head];
            words.extend(tail);
            words.join(" ")
        })
}

fn note() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(NOTE_PIECES), 0..12)
        .prop_map(|pieces| format!("Patient {}", pieces.join(" ")))
}

fn gender() -> impl Strategy<Value = Gender> {
    prop_oneof![Just(Gender::Male), Just(Gender::Female), Just(Gender::Other)]
}

fn visit_type() -> impl Strategy<Value = VisitType> {
    prop_oneof![
        Just(VisitType::Outpatient),
        Just(VisitType::Inpatient),
        Just(VisitType::Emergency),
        Just(VisitType::Telehealth),
        Just(VisitType::FollowUp),
    ]
}

fn outcome() -> impl Strategy<Value = Outcome> {
    prop_oneof![
        Just(Outcome::Improved),
        Just(Outcome::Stable),
        Just(Outcome::Worsened),
        Just(Outcome::Resolved),
        Just(Outcome::Referred),
        Just(Outcome::Hospitalized),
    ]
}

fn vitals() -> impl Strategy<Value = VitalSigns> {
    (
        50u16..=260,
        30u16..=160,
        20u16..=250,
        90.0f64..=110.0,
        4u16..=60,
        50u8..=100,
    )
        .prop_map(
            |(systolic_bp, diastolic_bp, heart_rate, temperature_f, respiratory_rate, oxygen_saturation)| {
                VitalSigns {
                    systolic_bp,
                    diastolic_bp,
                    heart_rate,
                    temperature_f,
                    respiratory_rate,
                    oxygen_saturation,
                }
            },
        )
}

fn labs() -> impl Strategy<Value = LabValues> {
    (
        prop::option::of(10.0f64..=1000.0),
        prop::option::of(50.0f64..=600.0),
        prop::option::of(2.0f64..=25.0),
    )
        .prop_map(|(glucose, cholesterol, hemoglobin)| LabValues {
            glucose,
            cholesterol,
            hemoglobin,
        })
}

/// Visit dates from 1900-01-01 into 2023, all before the fixed creation timestamp.
fn visit_date() -> impl Strategy<Value = NaiveDate> {
    (0u64..=45_000).prop_map(|days| {
        NaiveDate::from_ymd_opt(1900, 1, 1)
            .and_then(|start| start.checked_add_days(Days::new(days)))
            .expect("date within range")
    })
}

fn record_input() -> impl Strategy<Value = RecordInput> {
    (
        (
            "[a-z0-9]{1,8}-[a-z0-9]{1,4}",
            visit_date(),
            0i64..=130,
            gender(),
            visit_type(),
            phrase(),
            prop::collection::vec(phrase(), 0..3),
        ),
        (
            phrase(),
            phrase(),
            phrase(),
            vitals(),
            labs(),
            note(),
            outcome(),
            prop::collection::vec(phrase(), 0..4),
        ),
    )
        .prop_map(
            |(
                (patient_id, visit_date, age, gender, visit_type, primary_symptom, secondary_symptoms),
                (diagnosis, treatment, specialty, vitals, labs, clinical_note, outcome, risk_factors),
            )| RecordInput {
                patient_id,
                visit_date,
                age,
                gender,
                visit_type,
                primary_symptom,
                secondary_symptoms,
                diagnosis,
                treatment,
                specialty,
                vitals,
                labs,
                clinical_note,
                outcome,
                risk_factors,
                created_at: Utc
                    .with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
                    .unwrap()
                    .fixed_offset(),
            },
        )
}

fn record() -> impl Strategy<Value = ClinicalRecord> {
    record_input().prop_map(|input| ClinicalRecord::new(input).expect("generated input is valid"))
}

fn records() -> impl Strategy<Value = Vec<ClinicalRecord>> {
    prop::collection::vec(record(), 0..6)
}

fn lab_line<'a>(content: &'a str, label: &str) -> &'a str {
    let prefix = format!("- {label}:");
    content
        .lines()
        .find(|line| line.starts_with(&prefix))
        .unwrap_or("")
}

proptest! {
    #![proptest_config(Config::with_cases(64))]

    #[test]
    fn formatting_is_byte_identical_across_calls(record in record()) {
        let formatter = DocumentFormatter::new();
        let first = formatter.format(&record).expect("format");
        let second = formatter.format(&record).expect("format");
        prop_assert_eq!(first.content.as_str().as_bytes(), second.content.as_str().as_bytes());
        prop_assert_eq!(first.metadata, second.metadata);
    }

    #[test]
    fn absent_labs_and_risk_factors_render_placeholders(record in record()) {
        let content = DocumentFormatter::new().render_content(&record).expect("render");
        let content = content.as_str();
        let labs = record.labs();

        for (label, value) in [
            ("Glucose", labs.glucose),
            ("Cholesterol", labs.cholesterol),
            ("Hemoglobin", labs.hemoglobin),
        ] {
            let line = lab_line(content, label);
            match value {
                None => {
                    prop_assert_eq!(line, format!("- {label}: Not measured"));
                }
                Some(v) => {
                    let expected_prefix = format!("- {label}: {v} ");
                    prop_assert!(line.starts_with(&expected_prefix));
                }
            }
        }

        let risk_line = lab_line(content, "Risk Factors");
        if record.risk_factors().is_empty() {
            prop_assert_eq!(risk_line, "- Risk Factors: None documented");
        } else {
            prop_assert!(!risk_line.contains("None documented"));
        }
    }

    #[test]
    fn export_then_import_is_identity(records in records()) {
        let collection = ingest(&records).expect("ingest");
        for format in [ExportFormat::Json, ExportFormat::JsonLines, ExportFormat::Yaml] {
            let text = export(&collection, format).expect("export");
            let imported = import(&text, format).expect("import");
            prop_assert_eq!(&imported, &collection, "format {}", format);
        }
    }

    #[test]
    fn parallel_ingest_equals_sequential(records in records()) {
        prop_assert_eq!(
            ingest_parallel(&records).expect("parallel"),
            ingest(&records).expect("sequential")
        );
    }

    #[test]
    fn blank_filter_term_is_identity(records in records(), blank in "[ \t]{0,3}") {
        let collection = ingest(&records).expect("ingest");
        prop_assert_eq!(&filter_by_diagnosis(&collection, &blank), &collection);
        prop_assert_eq!(&filter_by_symptom(&collection, &blank), &collection);
    }

    #[test]
    fn diagnosis_filter_ignores_case_and_keeps_order(records in records()) {
        let collection = ingest(&records).expect("ingest");
        for document in &collection {
            let shouted = document.metadata().diagnosis.as_str().to_uppercase();
            let matched = filter_by_diagnosis(&collection, &shouted);
            prop_assert!(matched.iter().any(|d| d.id() == document.id()));

            let ids: Vec<usize> = matched.iter().map(|d| d.id().index()).collect();
            prop_assert!(ids.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
