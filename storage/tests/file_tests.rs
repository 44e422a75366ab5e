//! File layer tests

mod common;

use std::fs::{self, File};
use std::io::Cursor;

use common::{temp_image, unique_temp_dir, SAMPLE, SPIDEV};
use hat_eeprom::{guid, AtomType, EepromError, Image};
use hat_eeprom_storage::{
    load_path, load_reader, save_path, EepromFile, OpenOptions, StorageError,
};

fn autosave() -> OpenOptions {
    OpenOptions {
        autosave: true,
        ..OpenOptions::default()
    }
}

#[test]
fn test_load_by_path() {
    let path = temp_image("load-path", SAMPLE);
    let image = load_path(&path).expect("Failed to load sample");
    assert_eq!(image.uuid().unwrap(), guid!("23872014-7f74-46f9-b521-02456d9c8261"));
    assert_eq!(image.vendor().unwrap(), b"The Factory");
}

#[test]
fn test_load_by_reader() {
    let from_memory = load_reader(Cursor::new(SPIDEV)).expect("Failed to load from memory");
    assert_eq!(from_memory.product().unwrap(), b"SPI Thing");

    let path = temp_image("load-reader", SPIDEV);
    let file = File::open(&path).unwrap();
    let from_file = load_reader(file).expect("Failed to load from file");
    assert_eq!(from_file, from_memory);
}

#[test]
fn test_save_by_path_is_byte_identical() {
    let image = load_reader(SAMPLE).unwrap();
    let path = unique_temp_dir("save-path").join("copy.eep");
    save_path(&image, &path).expect("Failed to save");
    assert_eq!(fs::read(&path).unwrap(), SAMPLE);
}

#[test]
fn test_save_to_writer_leaves_store_untouched() {
    let path = temp_image("save-writer", SPIDEV);
    let mut eeprom = EepromFile::open(&path, OpenOptions::default()).unwrap();
    eeprom.set_product_id(0x0001).unwrap();

    let mut out = Vec::new();
    eeprom.save_to_writer(&mut out).unwrap();
    assert_eq!(load_reader(out.as_slice()).unwrap().product_id().unwrap(), 0x0001);

    let other = path.with_file_name("other.eep");
    eeprom.save_to_path(&other).unwrap();
    assert_eq!(fs::read(&other).unwrap(), out);

    drop(eeprom);
    assert_eq!(fs::read(&path).unwrap(), SPIDEV);
}

#[test]
fn test_scoped_autosave() {
    let path = temp_image("autosave", SAMPLE);

    EepromFile::scoped(&path, autosave(), |eeprom| {
        eeprom.set_vendor(b"New Vendor".to_vec())?;
        eeprom.set_uuid(guid!("dac2b929-0ee5-4a3c-9c2f-71d0c7b4e5a1"))?;
        Ok(())
    })
    .expect("Scoped edit failed");

    let image = load_path(&path).unwrap();
    assert_eq!(image.vendor().unwrap(), b"New Vendor");
    assert_eq!(image.uuid().unwrap(), guid!("dac2b929-0ee5-4a3c-9c2f-71d0c7b4e5a1"));
    assert_eq!(image.product().unwrap(), b"Sample Board");

    // Without autosave, edits are dropped with the scope
    EepromFile::scoped(&path, OpenOptions::default(), |eeprom| {
        eeprom.set_vendor(b"Discarded".to_vec())?;
        Ok(())
    })
    .unwrap();
    assert_eq!(load_path(&path).unwrap().vendor().unwrap(), b"New Vendor");
}

#[test]
fn test_scoped_returns_value() {
    let path = temp_image("scoped-value", SAMPLE);
    let pid = EepromFile::scoped(&path, OpenOptions::default(), |eeprom| {
        Ok(eeprom.product_id()?)
    })
    .unwrap();
    assert_eq!(pid, 0xcafe);
}

#[test]
fn test_scoped_error_skips_save() {
    let path = temp_image("scoped-error", SAMPLE);

    let result: Result<(), _> = EepromFile::scoped(&path, autosave(), |eeprom| {
        eeprom.set_product(b"Half Done".to_vec())?;
        eeprom.remove_kind(AtomType::VendorInfo);
        eeprom.product_id()?;
        Ok(())
    });

    assert!(matches!(
        result,
        Err(StorageError::Eeprom(EepromError::MissingAtom(AtomType::VendorInfo)))
    ));
    assert_eq!(fs::read(&path).unwrap(), SAMPLE);
}

#[test]
fn test_explicit_save() {
    let path = temp_image("explicit-save", SAMPLE);

    let mut eeprom = EepromFile::open(&path, OpenOptions::default()).unwrap();
    eeprom.set_product_version(0x0100).unwrap();
    eeprom.save().expect("Failed to save");
    drop(eeprom);

    assert_eq!(load_path(&path).unwrap().product_version().unwrap(), 0x0100);
}

#[test]
fn test_save_shrinks_file() {
    let path = temp_image("shrink", SPIDEV);

    let mut eeprom = EepromFile::open(&path, OpenOptions::default()).unwrap();
    eeprom.remove_kind(AtomType::DeviceTree);
    let expected = eeprom.encode().unwrap();
    eeprom.close().unwrap();
    assert_eq!(fs::read(&path).unwrap(), SPIDEV, "close without autosave wrote");

    let mut eeprom = EepromFile::open(&path, OpenOptions::default()).unwrap();
    eeprom.remove_kind(AtomType::DeviceTree);
    eeprom.save().unwrap();
    drop(eeprom);
    assert_eq!(fs::read(&path).unwrap(), expected);
}

#[test]
fn test_reload_discards_changes() {
    let path = temp_image("reload", SAMPLE);
    let mut eeprom = EepromFile::open(&path, OpenOptions::default()).unwrap();
    eeprom.set_product_id(0).unwrap();
    eeprom.load().unwrap();
    assert_eq!(eeprom.product_id().unwrap(), 0xcafe);
}

#[test]
fn test_read_only() {
    let path = temp_image("read-only", SAMPLE);
    let options = OpenOptions {
        read_only: true,
        autosave: true,
        ..OpenOptions::default()
    };

    let mut eeprom = EepromFile::open(&path, options).unwrap();
    eeprom.set_product_id(1).unwrap();
    assert!(matches!(eeprom.save(), Err(StorageError::ReadOnly)));
    assert!(matches!(eeprom.close(), Err(StorageError::ReadOnly)));
    assert_eq!(fs::read(&path).unwrap(), SAMPLE);
}

#[test]
fn test_without_autoload() {
    let path = unique_temp_dir("no-autoload").join("blank.eep");
    fs::write(&path, [0xFF; 64]).unwrap();

    let options = OpenOptions {
        autoload: false,
        autosave: true,
        ..OpenOptions::default()
    };
    let mut eeprom = EepromFile::open(&path, options).unwrap();
    assert!(eeprom.atoms().is_empty());
    eeprom.set_vendor_info(load_reader(SAMPLE).unwrap().vendor_info().unwrap().clone());
    eeprom.close().unwrap();

    let image = load_path(&path).unwrap();
    assert_eq!(image.atoms().len(), 1);
    assert_eq!(image.product().unwrap(), b"Sample Board");
}

#[test]
fn test_memory_store() {
    let mut eeprom = EepromFile::from_store(Cursor::new(SAMPLE.to_vec()), autosave()).unwrap();
    assert_eq!(eeprom.options(), autosave());
    eeprom.image_mut().set_product(b"In Memory".to_vec()).unwrap();
    eeprom.save().unwrap();

    let (image, store) = eeprom.into_parts();
    let saved = store.into_inner();
    assert_eq!(saved, image.encode().unwrap());
    assert_eq!(load_reader(saved.as_slice()).unwrap().product().unwrap(), b"In Memory");
}

#[test]
fn test_with_image() {
    let image = load_reader(SPIDEV).unwrap();
    let eeprom = EepromFile::with_image(Cursor::new(Vec::new()), image.clone(), autosave());
    assert_eq!(eeprom.image(), &image);
    eeprom.close().unwrap();
}

#[test]
fn test_decode_error_passes_through() {
    let path = temp_image("bad-magic", b"X-Pi\x01\x00\x00\x00\x0c\x00\x00\x00");
    let err = load_path(&path).unwrap_err();
    assert_eq!(err.eeprom_kind(), Some(&EepromError::InvalidFormat));

    let err = EepromFile::open(&path, OpenOptions::default()).err().unwrap();
    assert_eq!(err.eeprom_kind(), Some(&EepromError::InvalidFormat));
}

#[test]
fn test_missing_file() {
    let path = unique_temp_dir("missing").join("absent.eep");
    assert!(load_path(&path).unwrap_err().is_not_found());
    assert!(EepromFile::open(&path, OpenOptions::default())
        .err()
        .unwrap()
        .is_not_found());
}

#[test]
fn test_empty_image_on_disk() {
    let path = unique_temp_dir("empty").join("empty.eep");
    save_path(&Image::new(), &path).unwrap();
    assert_eq!(fs::read(&path).unwrap().len(), 12);
    assert!(load_path(&path).unwrap().atoms().is_empty());
}
