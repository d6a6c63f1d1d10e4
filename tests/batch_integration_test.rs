use jp2_ortho_convert::core::{RasterBackend, RasterDataset};
use jp2_ortho_convert::{
    BatchConverter, ConversionRequest, ConvertError, GeoMetadata, GroundControlPoint,
    LocalStorage, OutputFormat, Result,
};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tempfile::TempDir;

/// Counts opened and released dataset handles.
#[derive(Default)]
struct HandleLedger {
    opened: usize,
    released: usize,
    copies: Vec<(PathBuf, Vec<(String, String)>)>,
}

/// Fake raster library. A file's text decides how it behaves:
/// `WIDTHxHEIGHT` opens as a raster of that size, `corrupt` cannot be opened,
/// `fail-copy` opens but cannot be transcoded.
#[derive(Clone, Default)]
struct MockBackend {
    ledger: Rc<RefCell<HandleLedger>>,
}

struct MockDataset {
    width: usize,
    height: usize,
    fail_copy: bool,
    ledger: Rc<RefCell<HandleLedger>>,
}

impl Drop for MockDataset {
    fn drop(&mut self) {
        self.ledger.borrow_mut().released += 1;
    }
}

impl RasterDataset for MockDataset {
    fn raster_size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn band_count(&self) -> usize {
        3
    }

    fn band_type_name(&self, index: usize) -> Option<String> {
        (1..=3).contains(&index).then(|| "GDT_Byte".to_string())
    }

    fn geo_transform(&self) -> Option<[f64; 6]> {
        Some([380000.0, 0.5, 0.0, 6700000.0, 0.0, -0.5])
    }

    fn projection(&self) -> String {
        "PROJCS[\"ETRS89 / TM35FIN(E,N)\"]".to_string()
    }

    fn metadata_domains(&self) -> Vec<String> {
        vec![String::new(), "IMAGE_STRUCTURE".to_string()]
    }

    fn metadata_domain(&self, domain: &str) -> Option<Vec<String>> {
        match domain {
            "" => Some(vec!["AREA_OR_POINT=Area".to_string()]),
            "IMAGE_STRUCTURE" => Some(vec!["COMPRESSION=JPEG2000".to_string()]),
            _ => None,
        }
    }

    fn gcps(&self) -> Vec<GroundControlPoint> {
        vec![GroundControlPoint {
            id: "1".to_string(),
            info: "upper left".to_string(),
            pixel: 0.0,
            line: 0.0,
            x: 380000.0,
            y: 6700000.0,
            z: 0.0,
        }]
    }
}

impl RasterBackend for MockBackend {
    type Dataset = MockDataset;

    fn open(&self, path: &Path) -> Result<MockDataset> {
        let text = fs::read_to_string(path)?;
        let text = text.trim();
        let open_failure = || ConvertError::OpenFailure {
            path: path.to_path_buf(),
            reason: "not recognized as a supported file format".to_string(),
        };

        let (width, height, fail_copy) = if text == "fail-copy" {
            (1, 1, true)
        } else {
            let (w, h) = text.split_once('x').ok_or_else(open_failure)?;
            let width = w.parse().map_err(|_| open_failure())?;
            let height = h.parse().map_err(|_| open_failure())?;
            (width, height, false)
        };

        self.ledger.borrow_mut().opened += 1;
        Ok(MockDataset {
            width,
            height,
            fail_copy,
            ledger: Rc::clone(&self.ledger),
        })
    }

    fn create_copy(
        &self,
        source: &MockDataset,
        _format: OutputFormat,
        target: &Path,
        options: &[(String, String)],
    ) -> Result<()> {
        if source.fail_copy {
            return Err(ConvertError::ConversionFailure {
                path: target.to_path_buf(),
                reason: "driver refused the copy".to_string(),
            });
        }
        fs::write(target, b"image")?;
        self.ledger
            .borrow_mut()
            .copies
            .push((target.to_path_buf(), options.to_vec()));
        Ok(())
    }
}

fn write_input(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn read_sidecar(path: &Path) -> GeoMetadata {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn count_with_suffix(dir: &Path, suffix: &str) -> usize {
    fs::read_dir(dir)
        .unwrap()
        .filter(|e| {
            e.as_ref()
                .unwrap()
                .file_name()
                .to_string_lossy()
                .ends_with(suffix)
        })
        .count()
}

#[test]
fn test_single_file_default_options() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(temp_dir.path(), "N5424G.jp2", "640x480");

    let backend = MockBackend::default();
    let request = ConversionRequest::new(&input, OutputFormat::default());
    let converter = BatchConverter::new(backend.clone(), LocalStorage::new(), request);

    let summary = converter.run(&input).unwrap();

    assert_eq!(summary.converted.len(), 1);
    assert!(summary.is_clean());

    let image = temp_dir.path().join("N5424G.jpg");
    let sidecar = temp_dir.path().join("N5424G.jpg.json");
    assert!(image.exists());
    assert!(sidecar.exists());
    assert_eq!(count_with_suffix(temp_dir.path(), ".jpg"), 1);
    assert_eq!(count_with_suffix(temp_dir.path(), ".jpg.json"), 1);

    let meta = read_sidecar(&sidecar);
    assert_eq!(meta.width, 640);
    assert_eq!(meta.height, 480);
    assert_eq!(meta.band_count, 3);
    assert_eq!(meta.data_type, "GDT_Byte");
    assert_eq!(meta.geo_transform.len(), 6);
    assert_eq!(meta.metadata["AREA_OR_POINT"], "Area");
    assert_eq!(meta.metadata_domains["IMAGE_STRUCTURE"]["COMPRESSION"], "JPEG2000");
    assert_eq!(meta.gcps[0].info, "upper left");
    assert!(meta.input_file.is_absolute());
    assert!(meta.output_file.ends_with("N5424G.jpg"));

    let ledger = backend.ledger.borrow();
    assert_eq!(
        ledger.copies[0].1,
        vec![("QUALITY".to_string(), "90".to_string())]
    );
    assert_eq!(ledger.opened, ledger.released);
}

#[test]
fn test_tiff_format_writes_tif_extension() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(temp_dir.path(), "tile.jp2", "10x10");

    let request = ConversionRequest::new(&input, OutputFormat::Tiff);
    let backend = MockBackend::default();
    let converter = BatchConverter::new(backend.clone(), LocalStorage::new(), request);
    converter.run(&input).unwrap();

    assert!(temp_dir.path().join("tile.tif").exists());
    assert!(temp_dir.path().join("tile.tif.json").exists());
    assert!(!temp_dir.path().join("tile.tiff").exists());
    assert!(backend.ledger.borrow().copies[0].1.is_empty());
}

#[test]
fn test_directory_produces_one_pair_per_input() {
    let temp_dir = TempDir::new().unwrap();
    let names = ["a", "b", "c"];
    for name in names {
        write_input(temp_dir.path(), &format!("{}.jp2", name), "8x4");
    }
    let out = temp_dir.path().join("converted");

    let request =
        ConversionRequest::new(temp_dir.path(), OutputFormat::Png).with_output_folder(&out);
    let converter = BatchConverter::new(MockBackend::default(), LocalStorage::new(), request);
    let summary = converter.run(temp_dir.path()).unwrap();

    assert_eq!(summary.converted.len(), names.len());
    assert_eq!(count_with_suffix(&out, ".png"), names.len());
    assert_eq!(count_with_suffix(&out, ".png.json"), names.len());
    for name in names {
        let image = out.join(format!("{}.png", name));
        assert!(summary.contains_output(&image));
        assert!(out.join(format!("{}.png.json", name)).exists());
    }
}

#[test]
fn test_summary_records_written_paths_per_input() {
    let temp_dir = TempDir::new().unwrap();
    let first = write_input(temp_dir.path(), "a.jp2", "8x8");
    let second = write_input(temp_dir.path(), "b.jp2", "8x8");
    let out = temp_dir.path().join("out");

    let request =
        ConversionRequest::new(temp_dir.path(), OutputFormat::Tiff).with_output_folder(&out);
    let converter = BatchConverter::new(MockBackend::default(), LocalStorage::new(), request);
    let summary = converter.run(temp_dir.path()).unwrap();

    assert_eq!(summary.total(), 2);
    let inputs: Vec<_> = summary.converted.iter().map(|c| c.input.clone()).collect();
    assert_eq!(inputs, vec![first, second]);
    for converted in &summary.converted {
        assert_eq!(converted.image.parent(), Some(out.as_path()));
        assert!(converted.image.exists());
        assert_eq!(
            converted.sidecar,
            PathBuf::from(format!("{}.json", converted.image.display()))
        );
        assert!(converted.sidecar.exists());
    }
}

#[test]
fn test_open_failure_is_skipped() {
    let temp_dir = TempDir::new().unwrap();
    write_input(temp_dir.path(), "a.jp2", "16x16");
    let broken = write_input(temp_dir.path(), "b.jp2", "corrupt");
    write_input(temp_dir.path(), "c.jp2", "16x16");

    let request = ConversionRequest::new(temp_dir.path(), OutputFormat::Jpg);
    let converter = BatchConverter::new(MockBackend::default(), LocalStorage::new(), request);
    let summary = converter.run(temp_dir.path()).unwrap();

    assert_eq!(summary.converted.len(), 2);
    assert_eq!(summary.skipped, vec![broken]);
    assert!(!temp_dir.path().join("b.jpg").exists());
    assert!(!temp_dir.path().join("b.jpg.json").exists());
    assert!(temp_dir.path().join("c.jpg.json").exists());
}

#[test]
fn test_conversion_failure_aborts_run_and_releases_handle() {
    let temp_dir = TempDir::new().unwrap();
    write_input(temp_dir.path(), "a.jp2", "16x16");
    write_input(temp_dir.path(), "b.jp2", "fail-copy");
    write_input(temp_dir.path(), "c.jp2", "16x16");

    let backend = MockBackend::default();
    let request = ConversionRequest::new(temp_dir.path(), OutputFormat::Jpg);
    let converter = BatchConverter::new(backend.clone(), LocalStorage::new(), request);

    let err = converter.run(temp_dir.path()).unwrap_err();

    assert!(matches!(err, ConvertError::ConversionFailure { .. }));
    assert!(temp_dir.path().join("a.jpg.json").exists());
    assert!(!temp_dir.path().join("c.jpg").exists());

    let ledger = backend.ledger.borrow();
    assert_eq!(ledger.opened, 2);
    assert_eq!(ledger.released, 2);
}

#[test]
fn test_keep_going_isolates_conversion_failures() {
    let temp_dir = TempDir::new().unwrap();
    write_input(temp_dir.path(), "a.jp2", "16x16");
    let failing = write_input(temp_dir.path(), "b.jp2", "fail-copy");
    write_input(temp_dir.path(), "c.jp2", "16x16");

    let backend = MockBackend::default();
    let request =
        ConversionRequest::new(temp_dir.path(), OutputFormat::Jpg).with_keep_going(true);
    let converter = BatchConverter::new(backend.clone(), LocalStorage::new(), request);

    let summary = converter.run(temp_dir.path()).unwrap();

    assert_eq!(summary.converted.len(), 2);
    assert_eq!(summary.failed, vec![failing]);
    assert!(temp_dir.path().join("c.jpg.json").exists());

    let ledger = backend.ledger.borrow();
    assert_eq!(ledger.opened, 3);
    assert_eq!(ledger.released, 3);
}

#[test]
fn test_empty_directory_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    write_input(temp_dir.path(), "notes.txt", "16x16");

    let request = ConversionRequest::new(temp_dir.path(), OutputFormat::Jpg);
    let converter = BatchConverter::new(MockBackend::default(), LocalStorage::new(), request);

    let err = converter.run(temp_dir.path()).unwrap_err();

    assert!(matches!(err, ConvertError::NoInputFiles { .. }));
    assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
}

#[test]
fn test_custom_jpeg_quality_is_passed_to_driver() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(temp_dir.path(), "q.jp2", "2x2");

    let backend = MockBackend::default();
    let request = ConversionRequest::new(&input, OutputFormat::Jpg).with_jpeg_quality(75);
    let converter = BatchConverter::new(backend.clone(), LocalStorage::new(), request);
    converter.run(&input).unwrap();

    assert_eq!(
        backend.ledger.borrow().copies[0].1,
        vec![("QUALITY".to_string(), "75".to_string())]
    );
}
