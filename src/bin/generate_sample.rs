//! Writes a deterministic sample invoice CSV in the published open-data
//! layout: semicolon-delimited, comma decimals, DD.MM.YYYY dates, Latin-1
//! encoded. Useful for trying the app without downloading the real file.

use std::io::Write;

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

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }
}

fn main() {
    let mut rng = SimpleRng::new(42);

    let accounts = [
        "Toimistotarvikkeet",
        "Asiantuntijapalvelut",
        "Kiinteistöjen kunnossapito",
        "ICT-palvelut",
        "Elintarvikkeet",
        "Koulutuspalvelut",
    ];
    let suppliers = [
        ("Säkylän Sähkö Oy", "FI"),
        ("Pohjolan Puhtaus Oy", "FI"),
        ("Nordic Office AB", "SE"),
        ("Kaarinan Kiinteistöhuolto Oy", "FI"),
        ("Baltic IT OÜ", "EE"),
        ("Länsi-Suomen Leipomo Oy", "FI"),
        ("Turun Tukkutori Oy", "FI"),
    ];

    let mut csv = String::from(
        "Tapaht.pvm;Laskun summa ilman ALV;Tilin nimi;Toimittajan  nimi;Toimittajan maakoodi\n",
    );

    let n_rows = 2000;
    for _ in 0..n_rows {
        let day = 1 + (rng.next_u64() % 28) as u32;
        let month = 1 + (rng.next_u64() % 12) as u32;

        // Mostly small invoices, a long positive tail, a few credit notes.
        let mut amount = (rng.next_f64().powi(3) * 50_000.0) + rng.next_f64() * 400.0;
        if rng.next_f64() < 0.03 {
            amount = -amount / 10.0;
        }

        let account = rng.pick(&accounts);
        let (supplier, country) = rng.pick(&suppliers);

        // Comma decimal separator, as in the source data.
        let amount_text = format!("{amount:.2}").replace('.', ",");
        csv.push_str(&format!(
            "{day:02}.{month:02}.2023;{amount_text};{account};{supplier};{country}\n"
        ));
    }

    let (bytes, _, _) = encoding_rs::WINDOWS_1252.encode(&csv);

    let output_path = "sample_invoices.csv";
    let mut file = std::fs::File::create(output_path).expect("Failed to create output file");
    file.write_all(&bytes).expect("Failed to write sample CSV");

    println!("Wrote {n_rows} invoices to {output_path} (Latin-1)");
}
