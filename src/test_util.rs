//! Synthetic FAT16 image construction, shared by unit and integration tests.
//!
//! No `.img` fixtures ship in this crate; every test builds the bytes it needs
//! in memory with [`build_fat16_image`].

#![cfg(test)]

const BYTES_PER_SECTOR: usize = 512;
const SECTORS_PER_CLUSTER: usize = 8;
const RESERVED_SECTORS: usize = 1;
const NUM_FATS: usize = 2;
const ROOT_ENTRIES: usize = 512;
const SECTORS_PER_FAT: usize = 32;
const DATA_CLUSTERS: usize = 64;

const ROOT_DIR_SECTORS: usize = (ROOT_ENTRIES * 32) / BYTES_PER_SECTOR;
const FAT_AREA_SECTORS: usize = NUM_FATS * SECTORS_PER_FAT;
const ROOT_DIR_FIRST_SECTOR: usize = RESERVED_SECTORS + FAT_AREA_SECTORS;
const DATA_FIRST_SECTOR: usize = ROOT_DIR_FIRST_SECTOR + ROOT_DIR_SECTORS;
const TOTAL_SECTORS: usize = DATA_FIRST_SECTOR + DATA_CLUSTERS * SECTORS_PER_CLUSTER;

/// Builds a complete, valid FAT16 disk image containing the given files at
/// root, each as a single contiguous run of clusters.
///
/// Returns the whole image as a byte vector; callers slice out sectors as needed.
pub(crate) fn build_fat16_image(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut img = vec![0u8; TOTAL_SECTORS * BYTES_PER_SECTOR];

    write_vbr(&mut img);

    let mut fat = vec![0u8; SECTORS_PER_FAT * BYTES_PER_SECTOR];
    write_u16(&mut fat, 0, 0xFFF8);
    write_u16(&mut fat, 2, 0xFFFF);

    let mut next_cluster = 2u32;
    let mut root_dir = vec![0u8; ROOT_DIR_SECTORS * BYTES_PER_SECTOR];

    for (i, (name, contents)) in files.iter().enumerate() {
        let first_cluster = next_cluster;
        let cluster_bytes = SECTORS_PER_CLUSTER * BYTES_PER_SECTOR;
        let needed_clusters = ((contents.len() + cluster_bytes - 1) / cluster_bytes).max(1);
        let clusters: Vec<u32> = (0..needed_clusters as u32).map(|n| first_cluster + n).collect();

        for (idx, &cluster) in clusters.iter().enumerate() {
            let entry_offset = cluster as usize * 2;
            let value = if idx + 1 < clusters.len() { clusters[idx + 1] } else { 0xFFFF };
            write_u16(&mut fat, entry_offset, value as u16);

            let cluster_sector = DATA_FIRST_SECTOR + (cluster as usize - 2) * SECTORS_PER_CLUSTER;
            let cluster_byte_off = cluster_sector * BYTES_PER_SECTOR;
            let src_off = idx * SECTORS_PER_CLUSTER * BYTES_PER_SECTOR;
            let src_end = (src_off + SECTORS_PER_CLUSTER * BYTES_PER_SECTOR).min(contents.len());
            if src_off < contents.len() {
                let chunk = &contents[src_off..src_end];
                img[cluster_byte_off..cluster_byte_off + chunk.len()].copy_from_slice(chunk);
            }
        }
        next_cluster += needed_clusters as u32;

        let entry_off = i * 32;
        root_dir[entry_off..entry_off + 11].copy_from_slice(&short_name_bytes(name));
        root_dir[entry_off + 11] = 0x20; // ARCHIVE
        write_u16(&mut root_dir, entry_off + 26, first_cluster as u16);
        root_dir[entry_off + 28..entry_off + 32].copy_from_slice(&(contents.len() as u32).to_le_bytes());
    }

    for copy in 0..NUM_FATS {
        let off = (RESERVED_SECTORS + copy * SECTORS_PER_FAT) * BYTES_PER_SECTOR;
        img[off..off + fat.len()].copy_from_slice(&fat);
    }
    let root_off = ROOT_DIR_FIRST_SECTOR * BYTES_PER_SECTOR;
    img[root_off..root_off + root_dir.len()].copy_from_slice(&root_dir);

    img
}

fn write_vbr(img: &mut [u8]) {
    write_u16(img, 11, BYTES_PER_SECTOR as u16);
    img[13] = SECTORS_PER_CLUSTER as u8;
    write_u16(img, 14, RESERVED_SECTORS as u16);
    img[16] = NUM_FATS as u8;
    write_u16(img, 17, ROOT_ENTRIES as u16);
    if TOTAL_SECTORS < 0x10000 {
        write_u16(img, 19, TOTAL_SECTORS as u16);
    } else {
        img[32..36].copy_from_slice(&(TOTAL_SECTORS as u32).to_le_bytes());
    }
    img[21] = 0xF8; // media type: fixed disk
    write_u16(img, 22, SECTORS_PER_FAT as u16);
    img[38] = 0x29; // extended boot signature
    write_u16(img, 510, 0xAA55);
}

fn write_u16(buf: &mut [u8], offset: usize, val: u16) {
    buf[offset..offset + 2].copy_from_slice(&val.to_le_bytes());
}

fn short_name_bytes(name: &str) -> [u8; 11] {
    let mut out = [b' '; 11];
    match name.split_once('.') {
        Some((base, ext)) => {
            let base = base.to_ascii_uppercase();
            let ext = ext.to_ascii_uppercase();
            let n = base.len().min(8);
            out[..n].copy_from_slice(&base.as_bytes()[..n]);
            let e = ext.len().min(3);
            out[8..8 + e].copy_from_slice(&ext.as_bytes()[..e]);
        }
        None => {
            let base = name.to_ascii_uppercase();
            let n = base.len().min(8);
            out[..n].copy_from_slice(&base.as_bytes()[..n]);
        }
    }
    out
}
