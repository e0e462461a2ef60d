//! SIMRS Khanza schema variant
//!
//! Queries a Khanza-style MySQL schema. SatuSehat ids for patients,
//! practitioners and clinics come from the deployment's mapping tables;
//! rows without a mapping surface as blank fields and fail snapshot
//! validation downstream instead of being silently dropped here.

use crate::adapters::source::rows::{
    DiagnosisRow, MedicationDispenseRow, MedicationRequestRow, ObservationRow, ProcedureRow,
    VisitRow,
};
use crate::adapters::source::VisitSource;
use crate::domain::{
    Diagnosis, MedicationDispense, MedicationRequest, ObservationLab, ObservationRadiology,
    Procedure, SourceError, Visit,
};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::MySqlPool;

const VISITS_BETWEEN: &str = r#"
SELECT r.no_rawat                      AS visit_id,
       COALESCE(mp.satusehat_id, '')  AS patient_satusehat_id,
       COALESCE(p.no_ktp, '')         AS patient_nik,
       COALESCE(p.nm_pasien, '')      AS patient_name,
       COALESCE(p.jk, '')             AS patient_sex,
       p.tgl_lahir                    AS patient_birth_date,
       COALESCE(p.alamat, '')         AS patient_address,
       COALESCE(d.no_ktp, '')         AS practitioner_nik,
       COALESCE(md.satusehat_id, '')  AS practitioner_satusehat_id,
       COALESCE(d.nm_dokter, '')      AS practitioner_name,
       COALESCE(ml.satusehat_id, '')  AS clinic_satusehat_id,
       COALESCE(pl.nm_poli, '')       AS clinic_name,
       CAST(v.tensi_sistole AS CHAR)  AS systole,
       CAST(v.tensi_diastole AS CHAR) AS diastole,
       CAST(v.nadi AS CHAR)           AS heart_rate,
       CAST(v.respirasi AS CHAR)      AS respiration_rate,
       CAST(v.spo2 AS CHAR)           AS oxygen_saturation,
       CAST(v.suhu_tubuh AS CHAR)     AS temperature,
       r.tgl_registrasi               AS period_start_date,
       r.tgl_selesai                  AS period_end_date,
       r.tgl_registrasi               AS arrived_start_time,
       r.tgl_panggil                  AS arrived_end_time,
       r.tgl_panggil                  AS in_progress_start_time,
       r.tgl_periksa_selesai          AS in_progress_end_time,
       r.tgl_periksa_selesai          AS finish_start_time,
       r.tgl_selesai                  AS finish_end_time
FROM reg_periksa r
         JOIN pasien p ON p.no_rkm_medis = r.no_rkm_medis
         JOIN dokter d ON d.kd_dokter = r.kd_dokter
         JOIN poliklinik pl ON pl.kd_poli = r.kd_poli
         LEFT JOIN satusehat_map_pasien mp ON mp.no_rkm_medis = p.no_rkm_medis
         LEFT JOIN satusehat_map_dokter md ON md.kd_dokter = d.kd_dokter
         LEFT JOIN satusehat_map_poli ml ON ml.kd_poli = pl.kd_poli
         LEFT JOIN pemeriksaan_ralan v ON v.no_rawat = r.no_rawat
WHERE r.stts = 'Sudah'
  AND r.tgl_registrasi BETWEEN ? AND ?
"#;

const DIAGNOSIS_BY_VISIT: &str = r#"
SELECT dp.no_rawat                  AS visit_id,
       COALESCE(py.kd_penyakit, '') AS diagnosis_code,
       COALESCE(py.nm_penyakit, '') AS diagnosis_name,
       dp.tgl_diagnosa              AS diagnosis_date
FROM diagnosa_pasien dp
         JOIN penyakit py ON py.kd_penyakit = dp.kd_penyakit
WHERE dp.no_rawat = ?
ORDER BY dp.prioritas
"#;

const LAB_BY_VISIT: &str = r#"
SELECT pl.no_urut                    AS visit_id,
       COALESCE(jl.nm_perawatan, '') AS lab_name,
       tl.pemeriksaan                AS lab_parameter,
       tl.satuan                     AS lab_unit,
       tl.nilai_rujukan              AS lab_normal,
       dl.nilai                      AS lab_result,
       dl.keterangan                 AS lab_flag,
       tl.metode                     AS lab_method,
       tl.kode_loinc                 AS lab_loinc_code,
       tl.nama_loinc                 AS lab_loinc_name,
       md.satusehat_id               AS practitioner_id,
       COALESCE(d.nm_dokter, '')     AS practitioner_name
FROM periksa_lab pl
         JOIN detail_periksa_lab dl ON dl.no_rawat = pl.no_rawat
         JOIN template_laboratorium tl ON tl.id_template = dl.id_template
         JOIN jns_perawatan_lab jl ON jl.kd_jenis_prw = pl.kd_jenis_prw
         JOIN dokter d ON d.kd_dokter = pl.kd_dokter
         LEFT JOIN satusehat_map_dokter md ON md.kd_dokter = d.kd_dokter
WHERE pl.no_rawat = ?
"#;

const RADIOLOGY_BY_VISIT: &str = r#"
SELECT pr.no_urut                    AS visit_id,
       COALESCE(jr.nm_perawatan, '') AS lab_name,
       hr.pemeriksaan                AS lab_parameter,
       NULL                          AS lab_unit,
       NULL                          AS lab_normal,
       hr.hasil                      AS lab_result,
       NULL                          AS lab_flag,
       NULL                          AS lab_method,
       jr.kode_loinc                 AS lab_loinc_code,
       jr.nama_loinc                 AS lab_loinc_name,
       md.satusehat_id               AS practitioner_id,
       COALESCE(d.nm_dokter, '')     AS practitioner_name
FROM periksa_radiologi pr
         JOIN jns_perawatan_radiologi jr ON jr.kd_jenis_prw = pr.kd_jenis_prw
         JOIN hasil_radiologi hr ON hr.no_rawat = pr.no_rawat
         JOIN dokter d ON d.kd_dokter = pr.kd_dokter
         LEFT JOIN satusehat_map_dokter md ON md.kd_dokter = d.kd_dokter
WHERE pr.no_rawat = ?
"#;

const MEDICATION_REQUEST_BY_VISIT: &str = r#"
SELECT ro.no_urut                AS visit_id,
       CASE WHEN ro.status = 'Ranap' THEN 'Inpatient' ELSE 'Outpatient' END AS patient_type,
       ro.tgl_peresepan          AS date,
       db.kode_brng              AS medicine_code,
       ro.no_resep               AS prescription_id,
       db.kode_kfa               AS kfa_code,
       db.nama_kfa               AS kfa_name,
       CASE WHEN rd.racikan = '1' THEN 'Compound' ELSE 'NonCompound' END AS type,
       md.satusehat_id           AS practitioner_id,
       d.nm_dokter               AS practitioner_name,
       rd.jml                    AS amount,
       COALESCE(db.satuan, '')   AS unit
FROM resep_obat ro
         JOIN resep_dokter rd ON rd.no_resep = ro.no_resep
         JOIN databarang db ON db.kode_brng = rd.kode_brng
         JOIN dokter d ON d.kd_dokter = ro.kd_dokter
         LEFT JOIN satusehat_map_dokter md ON md.kd_dokter = d.kd_dokter
WHERE ro.no_rawat = ?
"#;

const MEDICATION_DISPENSE_BY_VISIT: &str = r#"
SELECT po.no_urut                 AS visit_id,
       CASE WHEN po.status = 'Ranap' THEN 'Inpatient' ELSE 'Outpatient' END AS patient_type,
       po.tgl_perawatan           AS date,
       COALESCE(db.kode_brng, '') AS medicine_code,
       po.no_resep                AS prescription_id,
       db.kode_kfa                AS kfa_code,
       db.nama_kfa                AS kfa_name,
       CASE WHEN po.racikan = '1' THEN 'Compound' ELSE 'NonCompound' END AS type,
       ma.satusehat_id            AS practitioner_id,
       a.nama                     AS practitioner_name,
       COALESCE(gb.no_batch, '')  AS batch_number,
       gb.expire                  AS expired_date,
       po.tgl_perawatan           AS prescription_start_date,
       po.tgl_penyerahan          AS handover_date
FROM pemberian_obat po
         JOIN databarang db ON db.kode_brng = po.kode_brng
         JOIN gudangbarang gb ON gb.kode_brng = po.kode_brng
         JOIN apoteker a ON a.nip = po.nip
         LEFT JOIN satusehat_map_apoteker ma ON ma.nip = a.nip
WHERE po.no_rawat = ?
"#;

const PROCEDURE_BY_VISIT: &str = r#"
SELECT pp.no_urut                         AS visit_id,
       COALESCE(ic.kode, '')              AS procedure_code,
       COALESCE(ic.deskripsi_panjang, '') AS procedure_name
FROM prosedur_pasien pp
         JOIN icd9 ic ON ic.kode = pp.kode
WHERE pp.no_rawat = ?
ORDER BY pp.prioritas
"#;

/// Khanza-schema implementation of [`VisitSource`].
pub struct KhanzaVisitSource {
    pool: MySqlPool,
}

impl KhanzaVisitSource {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn fetch_rows<R, T>(&self, sql: &str, visit_id: &str) -> Result<Vec<T>, SourceError>
    where
        R: for<'r> sqlx::FromRow<'r, sqlx::mysql::MySqlRow> + Send + Unpin,
        T: From<R>,
    {
        let rows: Vec<R> = sqlx::query_as(sql)
            .bind(visit_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| SourceError::QueryFailed(e.to_string()))?;
        Ok(rows.into_iter().map(T::from).collect())
    }
}

#[async_trait]
impl VisitSource for KhanzaVisitSource {
    async fn fetch_visits_between(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Visit>, SourceError> {
        let rows: Vec<VisitRow> = sqlx::query_as(VISITS_BETWEEN)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| SourceError::QueryFailed(e.to_string()))?;
        Ok(rows.into_iter().map(Visit::from).collect())
    }

    async fn fetch_diagnosis(&self, visit_id: &str) -> Result<Vec<Diagnosis>, SourceError> {
        self.fetch_rows::<DiagnosisRow, _>(DIAGNOSIS_BY_VISIT, visit_id)
            .await
    }

    async fn fetch_lab(&self, visit_id: &str) -> Result<Vec<ObservationLab>, SourceError> {
        self.fetch_rows::<ObservationRow, _>(LAB_BY_VISIT, visit_id)
            .await
    }

    async fn fetch_radiology(
        &self,
        visit_id: &str,
    ) -> Result<Vec<ObservationRadiology>, SourceError> {
        self.fetch_rows::<ObservationRow, _>(RADIOLOGY_BY_VISIT, visit_id)
            .await
    }

    async fn fetch_medication_request(
        &self,
        visit_id: &str,
    ) -> Result<Vec<MedicationRequest>, SourceError> {
        self.fetch_rows::<MedicationRequestRow, _>(MEDICATION_REQUEST_BY_VISIT, visit_id)
            .await
    }

    async fn fetch_medication_dispense(
        &self,
        visit_id: &str,
    ) -> Result<Vec<MedicationDispense>, SourceError> {
        self.fetch_rows::<MedicationDispenseRow, _>(MEDICATION_DISPENSE_BY_VISIT, visit_id)
            .await
    }

    async fn fetch_procedure(&self, visit_id: &str) -> Result<Vec<Procedure>, SourceError> {
        self.fetch_rows::<ProcedureRow, _>(PROCEDURE_BY_VISIT, visit_id)
            .await
    }
}
