//! Medifirst schema variant
//!
//! Same capability as the Khanza variant over a Medifirst-style schema:
//! registration lives in `t_pendaftaran`, master data in `m_*` tables and
//! the SatuSehat ids are stored directly on the master rows.

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
SELECT t.no_register                      AS visit_id,
       COALESCE(ps.id_satusehat, '')      AS patient_satusehat_id,
       COALESCE(ps.nik, '')               AS patient_nik,
       COALESCE(ps.nama_lengkap, '')      AS patient_name,
       COALESCE(ps.jenis_kelamin, '')     AS patient_sex,
       ps.tgl_lahir                       AS patient_birth_date,
       COALESCE(ps.alamat, '')            AS patient_address,
       COALESCE(pg.nik, '')               AS practitioner_nik,
       COALESCE(pg.id_satusehat, '')      AS practitioner_satusehat_id,
       COALESCE(pg.nama_pegawai, '')      AS practitioner_name,
       COALESCE(ru.id_satusehat, '')      AS clinic_satusehat_id,
       COALESCE(ru.nama_ruangan, '')      AS clinic_name,
       CAST(tv.sistole AS CHAR)           AS systole,
       CAST(tv.diastole AS CHAR)          AS diastole,
       CAST(tv.frekuensi_nadi AS CHAR)    AS heart_rate,
       CAST(tv.frekuensi_nafas AS CHAR)   AS respiration_rate,
       CAST(tv.saturasi_o2 AS CHAR)       AS oxygen_saturation,
       CAST(tv.suhu AS CHAR)              AS temperature,
       t.tgl_pendaftaran                  AS period_start_date,
       t.tgl_pulang                       AS period_end_date,
       t.tgl_pendaftaran                  AS arrived_start_time,
       t.tgl_masuk_ruangan                AS arrived_end_time,
       t.tgl_masuk_ruangan                AS in_progress_start_time,
       t.tgl_selesai_periksa              AS in_progress_end_time,
       t.tgl_selesai_periksa              AS finish_start_time,
       t.tgl_pulang                       AS finish_end_time
FROM t_pendaftaran t
         JOIN m_pasien ps ON ps.id_pasien = t.id_pasien
         JOIN m_pegawai pg ON pg.id_pegawai = t.id_dokter
         JOIN m_ruangan ru ON ru.id_ruangan = t.id_ruangan
         LEFT JOIN t_tanda_vital tv ON tv.no_register = t.no_register
WHERE t.status_pulang = 'Selesai'
  AND t.tgl_pendaftaran BETWEEN ? AND ?
"#;

const DIAGNOSIS_BY_VISIT: &str = r#"
SELECT td.no_register            AS visit_id,
       COALESCE(mi.kode_icd, '') AS diagnosis_code,
       COALESCE(mi.nama_icd, '') AS diagnosis_name,
       td.tgl_diagnosa           AS diagnosis_date
FROM t_diagnosa td
         JOIN m_icd10 mi ON mi.id_icd = td.id_icd
WHERE td.no_register = ?
ORDER BY td.urutan
"#;

const LAB_BY_VISIT: &str = r#"
SELECT tl.id_tindakan            AS visit_id,
       COALESCE(ml.nama_periksa, '') AS lab_name,
       tl.parameter              AS lab_parameter,
       tl.satuan                 AS lab_unit,
       tl.nilai_normal           AS lab_normal,
       tl.hasil                  AS lab_result,
       tl.flag                   AS lab_flag,
       tl.metode                 AS lab_method,
       ml.kode_loinc             AS lab_loinc_code,
       ml.nama_loinc             AS lab_loinc_name,
       pg.id_satusehat           AS practitioner_id,
       COALESCE(pg.nama_pegawai, '') AS practitioner_name
FROM t_hasil_lab tl
         JOIN m_periksa_lab ml ON ml.id_periksa = tl.id_periksa
         JOIN m_pegawai pg ON pg.id_pegawai = tl.id_dokter
WHERE tl.no_register = ?
"#;

const RADIOLOGY_BY_VISIT: &str = r#"
SELECT tr.id_tindakan            AS visit_id,
       COALESCE(mr.nama_periksa, '') AS lab_name,
       tr.pemeriksaan            AS lab_parameter,
       NULL                      AS lab_unit,
       NULL                      AS lab_normal,
       tr.hasil_bacaan           AS lab_result,
       NULL                      AS lab_flag,
       NULL                      AS lab_method,
       mr.kode_loinc             AS lab_loinc_code,
       mr.nama_loinc             AS lab_loinc_name,
       pg.id_satusehat           AS practitioner_id,
       COALESCE(pg.nama_pegawai, '') AS practitioner_name
FROM t_hasil_radiologi tr
         JOIN m_periksa_radiologi mr ON mr.id_periksa = tr.id_periksa
         JOIN m_pegawai pg ON pg.id_pegawai = tr.id_dokter
WHERE tr.no_register = ?
"#;

const MEDICATION_REQUEST_BY_VISIT: &str = r#"
SELECT tr.id_resep               AS visit_id,
       CASE WHEN tr.jenis_rawat = 'RI' THEN 'Inpatient' ELSE 'Outpatient' END AS patient_type,
       tr.tgl_resep              AS date,
       ob.kode_obat              AS medicine_code,
       tr.no_resep               AS prescription_id,
       ob.kode_kfa               AS kfa_code,
       ob.nama_kfa               AS kfa_name,
       CASE WHEN dr.is_racikan = 1 THEN 'Compound' ELSE 'NonCompound' END AS type,
       pg.id_satusehat           AS practitioner_id,
       pg.nama_pegawai           AS practitioner_name,
       dr.jumlah                 AS amount,
       COALESCE(ob.satuan, '')   AS unit
FROM t_resep tr
         JOIN t_resep_detail dr ON dr.no_resep = tr.no_resep
         JOIN m_obat ob ON ob.id_obat = dr.id_obat
         JOIN m_pegawai pg ON pg.id_pegawai = tr.id_dokter
WHERE tr.no_register = ?
"#;

const MEDICATION_DISPENSE_BY_VISIT: &str = r#"
SELECT tp.id_penyerahan          AS visit_id,
       CASE WHEN tp.jenis_rawat = 'RI' THEN 'Inpatient' ELSE 'Outpatient' END AS patient_type,
       tp.tgl_penyiapan          AS date,
       COALESCE(ob.kode_obat, '') AS medicine_code,
       tp.no_resep               AS prescription_id,
       ob.kode_kfa               AS kfa_code,
       ob.nama_kfa               AS kfa_name,
       CASE WHEN tp.is_racikan = 1 THEN 'Compound' ELSE 'NonCompound' END AS type,
       pg.id_satusehat           AS practitioner_id,
       pg.nama_pegawai           AS practitioner_name,
       COALESCE(st.no_batch, '') AS batch_number,
       st.tgl_kadaluarsa         AS expired_date,
       tp.tgl_penyiapan          AS prescription_start_date,
       tp.tgl_penyerahan         AS handover_date
FROM t_penyerahan_obat tp
         JOIN m_obat ob ON ob.id_obat = tp.id_obat
         JOIN m_stok_obat st ON st.id_obat = ob.id_obat
         JOIN m_pegawai pg ON pg.id_pegawai = tp.id_apoteker
WHERE tp.no_register = ?
"#;

const PROCEDURE_BY_VISIT: &str = r#"
SELECT tt.id_tindakan            AS visit_id,
       COALESCE(mi.kode_icd9, '') AS procedure_code,
       COALESCE(mi.nama_icd9, '') AS procedure_name
FROM t_tindakan tt
         JOIN m_icd9 mi ON mi.id_icd9 = tt.id_icd9
WHERE tt.no_register = ?
ORDER BY tt.urutan
"#;

/// Medifirst-schema implementation of [`VisitSource`].
pub struct MedifirstVisitSource {
    pool: MySqlPool,
}

impl MedifirstVisitSource {
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
impl VisitSource for MedifirstVisitSource {
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
