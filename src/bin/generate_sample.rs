//! Writes a deterministic sample HSCA workbook for manual testing.
//! The output includes other directorates, missing brands/beds, and
//! unparsable cells so every loader path gets exercised.

use rust_xlsxwriter::Workbook;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }

    fn range(&mut self, lo: u64, hi: u64) -> u64 {
        lo + self.next_u64() % (hi - lo + 1)
    }
}

const HEADERS: [&str; 11] = [
    "Location ID",
    "Location Name",
    "Provider Name",
    "Brand Name",
    "Location Local Authority",
    "Location Inspection Directorate",
    "Care homes beds",
    "Location Latest Overall Rating",
    "Publication Date",
    "Location Latitude",
    "Location Longitude",
];

fn main() {
    let mut rng = SimpleRng::new(42);

    let brands = [
        "Rosewood Care",
        "Harbour Homes",
        "Meadow View Group",
        "St. Aidan's",
        "Willow Health",
        "Brookfield Living",
    ];
    let authorities = ["Leeds", "Bradford", "York", "Kirklees", "Wakefield"];
    let ratings = ["Good", "Outstanding", "Requires improvement", "Inadequate"];
    let directorates = [
        "Adult social care",
        "Adult social care",
        "Adult social care",
        "Children's services",
        "Hospitals",
    ];

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet
        .set_name("HSCA_Active_Locations")
        .expect("Failed to name sheet");

    for (col, header) in HEADERS.iter().enumerate() {
        sheet
            .write_string(0, col as u16, *header)
            .expect("Failed to write header");
    }

    let n_rows: u32 = 200;
    for i in 0..n_rows {
        let row = i + 1;
        let brand = rng.pick(&brands);
        let authority = rng.pick(&authorities);
        let directorate = rng.pick(&directorates);
        let beds = rng.range(4, 180);
        let year = rng.range(2021, 2024);
        let month = rng.range(1, 12);
        let day = rng.range(1, 28);

        sheet
            .write_string(row, 0, format!("1-{:09}", 100_000_000 + i))
            .unwrap();
        sheet
            .write_string(row, 1, format!("{brand} Home {i:03}"))
            .unwrap();
        sheet
            .write_string(row, 2, format!("{brand} Ltd"))
            .unwrap();
        // Every 17th row is missing its brand; the loader drops those.
        if i % 17 != 0 {
            sheet.write_string(row, 3, *brand).unwrap();
        }
        sheet.write_string(row, 4, *authority).unwrap();
        sheet.write_string(row, 5, *directorate).unwrap();
        // Every 23rd row has an unparsable bed count.
        if i % 23 == 0 {
            sheet.write_string(row, 6, "unknown").unwrap();
        } else {
            sheet.write_number(row, 6, beds as f64).unwrap();
        }
        // Roughly one in five rows is unrated.
        if rng.next_u64() % 5 != 0 {
            sheet.write_string(row, 7, *rng.pick(&ratings)).unwrap();
        }
        sheet
            .write_string(row, 8, format!("{year}-{month:02}-{day:02}"))
            .unwrap();
        // Coordinates scattered over England; a few rows left ungeocoded.
        if i % 11 != 0 {
            let lat = 50.5 + rng.range(0, 400) as f64 / 100.0;
            let lon = -3.0 + rng.range(0, 350) as f64 / 100.0;
            sheet.write_number(row, 9, lat).unwrap();
            sheet.write_number(row, 10, lon).unwrap();
        }
    }

    let output_path = "sample_hsca.xlsx";
    workbook.save(output_path).expect("Failed to save workbook");
    println!("Wrote {n_rows} locations to {output_path}");
}
